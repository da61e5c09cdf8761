use std::time::Duration;

use async_trait::async_trait;
use fabula_core::ResourceKind;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::{
    error::{ApiError, ApiResult},
    models::{Book, GenerateAck, GenerateOptions, PresignedTarget, RegenerateTarget},
    traits::Api,
};

/// Configuration for [`ApiClient`].
#[derive(Clone, Debug)]
pub struct ApiOptions {
    /// Backend base URL, e.g. `https://api.example.com`.
    pub base_url: Url,
    /// Bearer token attached to every call when present.
    pub auth_token: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ApiOptions {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            auth_token: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    key: &'a str,
    content_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResourceRequest {
    #[serde(rename = "type")]
    kind: ResourceKind,
    r2_url: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FallbackUploadRequest {
    #[serde(rename = "type")]
    kind: ResourceKind,
    source_url: Url,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FallbackUploadResponse {
    r2_url: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegenerateRequest {
    #[serde(rename = "type")]
    target: RegenerateTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<String>,
}

/// Typed client for the generator backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Url,
    proxy: Url,
    token: Option<String>,
    inner: Client,
}

impl ApiClient {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build or the base
    /// URL cannot carry endpoint paths (e.g. a `data:` URL).
    #[must_use]
    pub fn new(options: ApiOptions) -> Self {
        let inner = Client::builder()
            .use_rustls_tls()
            .timeout(options.request_timeout)
            .build()
            .expect("failed to build reqwest client");
        let proxy = options
            .base_url
            .join("/r2/proxy")
            .expect("base URL must accept endpoint paths");
        Self {
            base: options.base_url,
            proxy,
            token: options.auth_token,
            inner,
        }
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Url(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self.inner.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let resp = req.send().await.map_err(ApiError::from)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute_unit(&self, req: RequestBuilder) -> ApiResult<()> {
        let resp = req.send().await.map_err(ApiError::from)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Api for ApiClient {
    async fn presigned_url(&self, key: &str, content_type: &str) -> ApiResult<PresignedTarget> {
        debug!(key, content_type, "requesting presigned upload target");
        let url = self.endpoint("/r2/presigned-url")?;
        let req = self
            .request(Method::POST, url)
            .json(&PresignRequest { key, content_type });
        self.execute(req).await
    }

    fn proxy_url(&self, source_url: Url) -> Url {
        let mut url = self.proxy.clone();
        url.query_pairs_mut()
            .append_pair("url", source_url.as_str());
        url
    }

    async fn book(&self, book_id: &str) -> ApiResult<Book> {
        let url = self.endpoint(&format!("/book/{book_id}"))?;
        self.execute(self.request(Method::GET, url)).await
    }

    async fn start_generation(
        &self,
        book_id: &str,
        options: GenerateOptions,
    ) -> ApiResult<GenerateAck> {
        debug!(book_id, "starting generation");
        let url = self.endpoint(&format!("/book/{book_id}/generate"))?;
        let req = self.request(Method::POST, url).json(&options);
        self.execute(req).await
    }

    async fn update_scene_resource(
        &self,
        book_id: &str,
        scene_number: u32,
        kind: ResourceKind,
        storage_url: Url,
    ) -> ApiResult<()> {
        debug!(book_id, scene_number, %kind, "recording durable resource URL");
        let url = self.endpoint(&format!("/book/{book_id}/scene/{scene_number}/resource"))?;
        let req = self.request(Method::PATCH, url).json(&UpdateResourceRequest {
            kind,
            r2_url: storage_url,
        });
        self.execute_unit(req).await
    }

    async fn fallback_upload(
        &self,
        book_id: &str,
        scene_number: u32,
        kind: ResourceKind,
        source_url: Url,
    ) -> ApiResult<Url> {
        debug!(book_id, scene_number, %kind, "requesting server-side compensating upload");
        let url = self.endpoint(&format!(
            "/book/{book_id}/scene/{scene_number}/fallback-upload"
        ))?;
        let req = self
            .request(Method::POST, url)
            .json(&FallbackUploadRequest { kind, source_url });
        let resp: FallbackUploadResponse = self.execute(req).await?;
        Ok(resp.r2_url)
    }

    async fn regenerate_scene(
        &self,
        book_id: &str,
        scene_number: u32,
        target: RegenerateTarget,
        voice_id: Option<String>,
    ) -> ApiResult<()> {
        let url = self.endpoint(&format!("/book/{book_id}/regenerate/{scene_number}"))?;
        let req = self
            .request(Method::POST, url)
            .json(&RegenerateRequest { target, voice_id });
        self.execute_unit(req).await
    }
}
