#![forbid(unsafe_code)]

use fabula_api::{Api, ApiClient, ApiOptions, GenerateOptions, RegenerateTarget};
use fabula_core::ResourceKind;
use fabula_events::{Event, EventBus};
use fabula_generate::{GenerateResult, Generator};
use fabula_net::HttpClient;
use fabula_upload::{UploadResult, Uploader};
use tokio::sync::broadcast;
use url::Url;

use crate::config::FabulaConfig;

/// Fully-wired client pipeline.
///
/// Shareable across tasks; distinct resources upload independently and in
/// parallel, while duplicate uploads of the same resource serialize.
pub struct Pipeline {
    api: ApiClient,
    bus: EventBus,
    uploader: Uploader<ApiClient, HttpClient>,
    generator: Generator<ApiClient>,
}

impl Pipeline {
    /// # Panics
    ///
    /// Panics if the underlying HTTP clients fail to build (see
    /// [`ApiClient::new`] and [`HttpClient::new`]).
    #[must_use]
    pub fn new(config: FabulaConfig) -> Self {
        let bus = EventBus::new(config.events_channel_capacity);
        let cancel = config.cancel.unwrap_or_default();

        let mut api_options =
            ApiOptions::new(config.base_url).with_request_timeout(config.net.request_timeout);
        if let Some(token) = config.auth_token {
            api_options = api_options.with_auth_token(token);
        }
        let api = ApiClient::new(api_options);
        let net = HttpClient::new(config.net);

        let uploader = Uploader::new(api.clone(), net, bus.clone())
            .with_policy(config.retry)
            .with_cancel(cancel.clone());
        let generator = Generator::new(api.clone(), bus.clone())
            .with_options(config.poll)
            .with_cancel(cancel);

        Self {
            api,
            bus,
            uploader,
            generator,
        }
    }

    /// Subscribe to pipeline events (upload and generation progress).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Relocate one scene asset to durable storage, escalating on failure.
    ///
    /// # Errors
    ///
    /// See [`Uploader::upload`].
    pub async fn upload_scene_resource(
        &self,
        book_id: &str,
        scene_number: u32,
        source_url: &Url,
        kind: ResourceKind,
    ) -> UploadResult<Url> {
        self.uploader
            .upload(book_id, scene_number, source_url, kind)
            .await
    }

    /// Start generation for `book_id` and wait for completion.
    ///
    /// # Errors
    ///
    /// See [`Generator::generate_and_wait`].
    pub async fn generate_and_wait(
        &self,
        book_id: &str,
        options: GenerateOptions,
    ) -> GenerateResult<()> {
        self.generator.generate_and_wait(book_id, options).await
    }

    /// Re-request generation of a single scene's assets — the manual-retry
    /// affordance behind a terminal upload failure.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`fabula_api::ApiError`] unchanged.
    pub async fn regenerate_scene(
        &self,
        book_id: &str,
        scene_number: u32,
        target: RegenerateTarget,
        voice_id: Option<String>,
    ) -> fabula_api::ApiResult<()> {
        self.api
            .regenerate_scene(book_id, scene_number, target, voice_id)
            .await
    }

    /// Direct access to the backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}
