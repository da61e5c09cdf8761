use async_trait::async_trait;
use fabula_core::ResourceKind;
use url::Url;

use crate::{
    error::ApiResult,
    models::{Book, GenerateAck, GenerateOptions, PresignedTarget, RegenerateTarget},
};

/// Backend surface consumed by the upload pipeline and generation poller.
///
/// Implemented by [`ApiClient`](crate::ApiClient); mockable at the seam so
/// retry/escalation/poll policy can be tested without a server.
#[cfg_attr(any(test, feature = "test-utils"), unimock::unimock(api = ApiMock))]
#[async_trait]
pub trait Api: Send + Sync {
    /// Mint a one-time upload target for `key`.
    async fn presigned_url(&self, key: &str, content_type: &str) -> ApiResult<PresignedTarget>;

    /// Same-origin relay URL for downloading `source_url`.
    ///
    /// Sources are often hosted where the browser gets no cross-origin
    /// grant, so downloads go through the backend proxy instead.
    fn proxy_url(&self, source_url: Url) -> Url;

    /// Book snapshot, including per-scene statuses.
    async fn book(&self, book_id: &str) -> ApiResult<Book>;

    /// Start a generation job. Returns immediately; completion is observed
    /// by polling [`Api::book`].
    async fn start_generation(
        &self,
        book_id: &str,
        options: GenerateOptions,
    ) -> ApiResult<GenerateAck>;

    /// Record the durable storage URL for a scene asset after a successful
    /// client-side upload. Idempotent on the backend: repeating the same URL
    /// is a no-op.
    async fn update_scene_resource(
        &self,
        book_id: &str,
        scene_number: u32,
        kind: ResourceKind,
        storage_url: Url,
    ) -> ApiResult<()>;

    /// Server-side compensating upload: the backend downloads `source_url`
    /// and stores it itself, bypassing client-side transfer limits. Returns
    /// the durable URL.
    async fn fallback_upload(
        &self,
        book_id: &str,
        scene_number: u32,
        kind: ResourceKind,
        source_url: Url,
    ) -> ApiResult<Url>;

    /// Re-request generation of a single scene's assets.
    async fn regenerate_scene(
        &self,
        book_id: &str,
        scene_number: u32,
        target: RegenerateTarget,
        voice_id: Option<String>,
    ) -> ApiResult<()>;
}
