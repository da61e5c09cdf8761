use std::time::Duration;

use fabula_api::{Api, BookStatus, GenerateOptions};
use fabula_events::{EventBus, GenerationEvent};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{GenerateError, GenerateResult};

/// Polling schedule for a running generation job.
#[derive(Clone, Debug)]
pub struct PollOptions {
    /// Wait between status polls.
    pub interval: Duration,
    /// Hard ceiling on polls; 120 × 5 s ≈ ten minutes.
    pub max_polls: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 120,
        }
    }
}

/// Starts a generation job and waits for it by polling the book status.
///
/// The start call is asynchronous: the backend acknowledges immediately and
/// completion is observed solely through polling. A backend that happens to
/// block until done simply reports `completed` on the first poll.
pub struct Generator<A> {
    api: A,
    bus: EventBus,
    options: PollOptions,
    cancel: CancellationToken,
}

impl<A: Api> Generator<A> {
    #[must_use]
    pub fn new(api: A, bus: EventBus) -> Self {
        Self {
            api,
            bus,
            options: PollOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PollOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Start generation for `book_id` and wait for it to finish.
    ///
    /// Emits a [`GenerationEvent::Progress`] per poll while the job runs.
    /// Transient poll errors are logged and tolerated — only the poll budget
    /// bounds the wait.
    ///
    /// # Errors
    ///
    /// [`GenerateError::Start`] when the job never started,
    /// [`GenerateError::Failed`] when the backend reports failure,
    /// [`GenerateError::Timeout`] when the budget is spent, and
    /// [`GenerateError::Cancelled`] when the caller gave up.
    pub async fn generate_and_wait(
        &self,
        book_id: &str,
        options: GenerateOptions,
    ) -> GenerateResult<()> {
        self.bus.publish(GenerationEvent::Started);
        let require_audio = options.generate_audio;

        let ack = self
            .api
            .start_generation(book_id, options)
            .await
            .map_err(GenerateError::Start)?;
        debug!(
            book_id,
            message = ack.message.as_deref().unwrap_or_default(),
            "generation job started"
        );

        for poll in 1..=self.options.max_polls {
            tokio::select! {
                () = sleep(self.options.interval) => {}
                () = self.cancel.cancelled() => return Err(GenerateError::Cancelled),
            }

            let book = match self.api.book(book_id).await {
                Ok(book) => book,
                Err(api_error) => {
                    // A single failed status check must not abort a
                    // multi-minute job.
                    warn!(book_id, poll, error = %api_error, "status poll failed — will poll again");
                    continue;
                }
            };

            match book.status {
                Some(BookStatus::Completed) => {
                    debug!(book_id, poll, "generation complete");
                    self.bus.publish(GenerationEvent::Completed);
                    return Ok(());
                }
                Some(BookStatus::Failed) => {
                    error!(book_id, poll, "backend reported generation failure");
                    return Err(GenerateError::Failed);
                }
                _ => {
                    let total_scenes = book.total_scenes();
                    let completed_scenes = book.generated_scenes(require_audio);
                    let percent = if total_scenes == 0 {
                        0.0
                    } else {
                        completed_scenes as f32 / total_scenes as f32 * 100.0
                    };
                    debug!(book_id, poll, completed_scenes, total_scenes, "generation in progress");
                    self.bus.publish(GenerationEvent::Progress {
                        completed_scenes,
                        total_scenes,
                        percent,
                    });
                }
            }
        }

        Err(GenerateError::Timeout {
            polls: self.options.max_polls,
        })
    }
}
