use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::NetError;

/// Byte-progress observer handed to [`Net::put_bytes`].
///
/// Called with `(loaded, total)` as the body streams out. The sink is the
/// transport-facing end of progress reporting; callers bridge it onto their
/// event bus with whatever context (scene, kind) the transport cannot know.
#[derive(Clone)]
pub struct ProgressSink(Arc<dyn Fn(u64, u64) + Send + Sync>);

impl ProgressSink {
    pub fn new(f: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn emit(&self, loaded: u64, total: u64) {
        (self.0)(loaded, total);
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressSink")
    }
}

/// Minimal transport surface the upload pipeline needs.
#[cfg_attr(any(test, feature = "test-utils"), unimock::unimock(api = NetMock))]
#[async_trait]
pub trait Net: Send + Sync {
    /// Download the full body at `url`.
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError>;

    /// PUT `body` to `url` with the given content type.
    ///
    /// Fire-once: no retry at this layer. Resolves only on HTTP 200.
    async fn put_bytes(
        &self,
        url: Url,
        body: Bytes,
        content_type: &str,
        progress: Option<ProgressSink>,
    ) -> Result<(), NetError>;
}
