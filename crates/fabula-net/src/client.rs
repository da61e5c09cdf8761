use std::convert::Infallible;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::{
    Client, StatusCode,
    header::{CONTENT_LENGTH, CONTENT_TYPE},
};
use url::Url;

use crate::{
    error::{NetError, NetResult},
    traits::{Net, ProgressSink},
    types::NetOptions,
};

/// Upload bodies are streamed in slices this large so the progress sink gets
/// byte-level updates instead of one final notification.
const PROGRESS_CHUNK: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    options: NetOptions,
}

impl HttpClient {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new(options: NetOptions) -> Self {
        let inner = Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .build()
            .expect("failed to build reqwest client");
        Self { inner, options }
    }

    /// # Errors
    ///
    /// Returns [`NetError`] on HTTP failure, timeout, or network error.
    pub async fn get_bytes(&self, url: Url) -> NetResult<Bytes> {
        <Self as Net>::get_bytes(self, url).await
    }

    /// # Errors
    ///
    /// Returns [`NetError`] on any status other than 200, timeout, or
    /// network error.
    pub async fn put_bytes(
        &self,
        url: Url,
        body: Bytes,
        content_type: &str,
        progress: Option<ProgressSink>,
    ) -> NetResult<()> {
        <Self as Net>::put_bytes(self, url, body, content_type, progress).await
    }
}

#[async_trait]
impl Net for HttpClient {
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError> {
        let req = self
            .inner
            .get(url.clone())
            .timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.ok();
            return Err(NetError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        resp.bytes().await.map_err(NetError::from)
    }

    async fn put_bytes(
        &self,
        url: Url,
        body: Bytes,
        content_type: &str,
        progress: Option<ProgressSink>,
    ) -> Result<(), NetError> {
        let total = body.len() as u64;
        let req = self
            .inner
            .put(url.clone())
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(progress_chunks(body, progress)))
            .timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        let status = resp.status();

        if status != StatusCode::OK {
            let body = resp.text().await.ok();
            return Err(NetError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(())
    }
}

/// Slice `body` into transport chunks, notifying `progress` as each chunk is
/// pulled by the connection.
fn progress_chunks(
    body: Bytes,
    progress: Option<ProgressSink>,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
    let total = body.len();
    futures::stream::iter((0..total).step_by(PROGRESS_CHUNK).map(move |start| {
        let end = usize::min(start + PROGRESS_CHUNK, total);
        let chunk = body.slice(start..end);
        if let Some(sink) = &progress {
            sink.emit(end as u64, total as u64);
        }
        Ok(chunk)
    }))
}
