use fabula_api::ApiError;
use thiserror::Error;

/// Failures of the generation phase, distinct from upload failures.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The request that starts the job failed; nothing is running.
    #[error("failed to start generation: {0}")]
    Start(#[source] ApiError),

    /// The backend reported the job as failed.
    #[error("generation failed")]
    Failed,

    /// The poll budget ran out before the job finished.
    #[error("generation timed out after {polls} status polls")]
    Timeout { polls: u32 },

    /// The caller abandoned the wait.
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerateError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
