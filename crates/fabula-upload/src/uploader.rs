use fabula_api::Api;
use fabula_core::{ResourceId, ResourceKind, StorageKey};
use fabula_events::{EventBus, UploadEvent};
use fabula_net::{Net, ProgressSink};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    error::{UploadError, UploadResult},
    inflight::InflightMap,
    policy::RetryPolicy,
};

/// Relocates one generated scene asset to durable object storage.
///
/// Layered: [`Uploader::upload`] is the escalation entry point (client
/// retries → server-side compensating upload → terminal error);
/// [`Uploader::upload_with_retry`] is the client tier on its own.
pub struct Uploader<A, N> {
    api: A,
    net: N,
    bus: EventBus,
    policy: RetryPolicy,
    inflight: InflightMap,
    cancel: CancellationToken,
}

impl<A: Api, N: Net> Uploader<A, N> {
    #[must_use]
    pub fn new(api: A, net: N, bus: EventBus) -> Self {
        Self {
            api,
            net,
            bus,
            policy: RetryPolicy::default(),
            inflight: InflightMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Upload `source_url` for one scene asset, escalating on failure.
    ///
    /// Tiers: client-side retried upload (the backend is notified of the new
    /// URL on success), then the backend's compensating upload, then a
    /// terminal [`UploadError::Failed`] for the UI to turn into a manual
    /// retry affordance.
    ///
    /// At most one invocation runs per `(book, scene, kind)` at a time;
    /// duplicates wait for the key instead of racing.
    ///
    /// # Errors
    ///
    /// [`UploadError::Failed`] when both tiers fail, or
    /// [`UploadError::Cancelled`] when the caller abandoned the upload.
    pub async fn upload(
        &self,
        book_id: &str,
        scene_number: u32,
        source_url: &Url,
        kind: ResourceKind,
    ) -> UploadResult<Url> {
        let id = ResourceId::new(book_id, scene_number, kind);
        let _guard = tokio::select! {
            guard = self.inflight.acquire(&id) => guard,
            () = self.cancel.cancelled() => return Err(UploadError::Cancelled),
        };

        let client_error = match self.upload_client_side(&id, source_url).await {
            Ok(url) => return Ok(url),
            Err(error @ UploadError::Cancelled) => return Err(error),
            Err(error) => error,
        };

        warn!(
            resource = %id,
            error = %client_error,
            "client-side upload exhausted — escalating to server-side upload"
        );
        self.bus
            .publish(UploadEvent::FallingBack { scene_number, kind });

        match self
            .api
            .fallback_upload(book_id, scene_number, kind, source_url.clone())
            .await
        {
            Ok(url) => {
                self.bus.publish(UploadEvent::Completed {
                    scene_number,
                    kind,
                    storage_url: url.clone(),
                });
                Ok(url)
            }
            Err(fallback_error) => {
                error!(
                    resource = %id,
                    error = %fallback_error,
                    "server-side compensating upload failed — manual retry required"
                );
                Err(UploadError::Failed {
                    source: Box::new(UploadError::Api(fallback_error)),
                })
            }
        }
    }

    /// Client tier: retried upload plus the resource-update notification.
    async fn upload_client_side(&self, id: &ResourceId, source_url: &Url) -> UploadResult<Url> {
        let url = self
            .upload_with_retry(id.scene_number, source_url, id.kind)
            .await?;
        self.api
            .update_scene_resource(&id.book_id, id.scene_number, id.kind, url.clone())
            .await?;

        self.bus.publish(UploadEvent::Completed {
            scene_number: id.scene_number,
            kind: id.kind,
            storage_url: url.clone(),
        });
        Ok(url)
    }

    /// Run presign→fetch→put attempts until one succeeds or the budget is
    /// spent, with linear backoff in between.
    ///
    /// Every attempt is independent: a fresh storage key and presigned URL
    /// are requested each time (stale presigned credentials are never
    /// reused) and partial progress from a failed attempt is discarded.
    ///
    /// # Errors
    ///
    /// [`UploadError::RetryExhausted`] wrapping the last attempt's error, or
    /// [`UploadError::Cancelled`].
    pub async fn upload_with_retry(
        &self,
        scene_number: u32,
        source_url: &Url,
        kind: ResourceKind,
    ) -> UploadResult<Url> {
        self.bus
            .publish(UploadEvent::Started { scene_number, kind });

        let mut last_error = None;
        for attempt in 0..self.policy.max_attempts {
            if self.cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }

            debug!(
                scene_number,
                %kind,
                attempt = attempt + 1,
                max_attempts = self.policy.max_attempts,
                "starting upload attempt"
            );

            let result = tokio::select! {
                result = self.upload_once(scene_number, source_url, kind) => result,
                () = self.cancel.cancelled() => return Err(UploadError::Cancelled),
            };

            match result {
                Ok(url) => return Ok(url),
                Err(error) => {
                    if attempt + 1 < self.policy.max_attempts {
                        let delay = self.policy.delay_after_attempt(attempt);
                        warn!(
                            scene_number,
                            %kind,
                            error = %error,
                            delay_ms = delay.as_millis() as u64,
                            "upload attempt failed — backing off"
                        );
                        self.bus.publish(UploadEvent::Retrying {
                            scene_number,
                            kind,
                            attempt: attempt + 1,
                            delay,
                        });
                        tokio::select! {
                            () = sleep(delay) => {}
                            () = self.cancel.cancelled() => return Err(UploadError::Cancelled),
                        }
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(UploadError::RetryExhausted {
            attempts: self.policy.max_attempts,
            source: Box::new(last_error.unwrap_or(UploadError::Cancelled)),
        })
    }

    /// One fire-once presign→fetch→put cycle.
    async fn upload_once(
        &self,
        scene_number: u32,
        source_url: &Url,
        kind: ResourceKind,
    ) -> UploadResult<Url> {
        let key = StorageKey::generate(kind, scene_number);
        let target = self
            .api
            .presigned_url(key.as_str(), kind.content_type())
            .await?;

        let blob = self
            .net
            .get_bytes(self.api.proxy_url(source_url.clone()))
            .await
            .map_err(UploadError::Fetch)?;
        debug!(scene_number, %kind, bytes = blob.len(), "source fetched — uploading");

        let sink = {
            let bus = self.bus.clone();
            ProgressSink::new(move |loaded, total| {
                let percent = if total == 0 {
                    0.0
                } else {
                    (loaded as f64 / total as f64 * 100.0) as f32
                };
                bus.publish(UploadEvent::Progress {
                    scene_number,
                    kind,
                    loaded,
                    total,
                    percent,
                });
            })
        };

        self.net
            .put_bytes(
                target.upload_url.clone(),
                blob,
                kind.content_type(),
                Some(sink),
            )
            .await
            .map_err(UploadError::Put)?;

        debug!(scene_number, %kind, url = %target.public_url, "upload complete");
        Ok(target.public_url)
    }
}
