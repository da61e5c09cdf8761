//! Stateful test doubles for the upload pipeline.
//!
//! Cloning shares the recorded state, so tests keep a handle while the
//! uploader owns its own copy.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use fabula_api::{
    Api, ApiError, ApiResult, Book, GenerateAck, GenerateOptions, PresignedTarget,
    RegenerateTarget,
};
use fabula_core::ResourceKind;
use fabula_net::{Net, NetError, ProgressSink};
use parking_lot::Mutex;
use url::Url;

/// Decrement a remaining-failures budget; true while failures remain.
fn take_failure(budget: &AtomicU32) -> bool {
    budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[derive(Clone)]
pub(crate) struct ScriptedApi {
    base: Url,
    keys: Arc<Mutex<Vec<String>>>,
    updates: Arc<Mutex<Vec<(String, u32, ResourceKind, Url)>>>,
    fail_updates: bool,
    fallback_calls: Arc<AtomicU32>,
    fallback_url: Option<Url>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self {
            base: Url::parse("https://backend.test").expect("static test URL"),
            keys: Arc::default(),
            updates: Arc::default(),
            fail_updates: false,
            fallback_calls: Arc::default(),
            fallback_url: Some(
                Url::parse("https://cdn.test/fallback/resource.bin").expect("static test URL"),
            ),
        }
    }

    pub(crate) fn with_fallback_url(mut self, url: &str) -> Self {
        self.fallback_url = Some(Url::parse(url).expect("test fallback URL"));
        self
    }

    pub(crate) fn with_failing_fallback(mut self) -> Self {
        self.fallback_url = None;
        self
    }

    pub(crate) fn with_failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.keys.lock().clone()
    }

    pub(crate) fn updates(&self) -> Vec<(String, u32, ResourceKind, Url)> {
        self.updates.lock().clone()
    }

    pub(crate) fn fallback_calls(&self) -> u32 {
        self.fallback_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Api for ScriptedApi {
    async fn presigned_url(&self, key: &str, _content_type: &str) -> ApiResult<PresignedTarget> {
        let mut keys = self.keys.lock();
        keys.push(key.to_owned());
        let attempt = keys.len();
        Ok(PresignedTarget {
            upload_url: Url::parse(&format!("https://storage.test/{key}?attempt={attempt}"))
                .expect("test upload URL"),
            public_url: Url::parse(&format!("https://cdn.test/{key}")).expect("test public URL"),
        })
    }

    fn proxy_url(&self, source_url: Url) -> Url {
        let mut url = self.base.join("/r2/proxy").expect("test proxy URL");
        url.query_pairs_mut().append_pair("url", source_url.as_str());
        url
    }

    async fn book(&self, _book_id: &str) -> ApiResult<Book> {
        unimplemented!("not used by upload tests")
    }

    async fn start_generation(
        &self,
        _book_id: &str,
        _options: GenerateOptions,
    ) -> ApiResult<GenerateAck> {
        unimplemented!("not used by upload tests")
    }

    async fn update_scene_resource(
        &self,
        book_id: &str,
        scene_number: u32,
        kind: ResourceKind,
        storage_url: Url,
    ) -> ApiResult<()> {
        if self.fail_updates {
            return Err(ApiError::Status {
                status: 500,
                body: "resource update rejected".into(),
            });
        }
        self.updates
            .lock()
            .push((book_id.to_owned(), scene_number, kind, storage_url));
        Ok(())
    }

    async fn fallback_upload(
        &self,
        _book_id: &str,
        _scene_number: u32,
        _kind: ResourceKind,
        _source_url: Url,
    ) -> ApiResult<Url> {
        self.fallback_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fallback_url {
            Some(url) => Ok(url.clone()),
            None => Err(ApiError::Status {
                status: 502,
                body: "server-side upload failed".into(),
            }),
        }
    }

    async fn regenerate_scene(
        &self,
        _book_id: &str,
        _scene_number: u32,
        _target: RegenerateTarget,
        _voice_id: Option<String>,
    ) -> ApiResult<()> {
        unimplemented!("not used by upload tests")
    }
}

#[derive(Clone)]
pub(crate) struct ScriptedNet {
    fail_gets: Arc<AtomicU32>,
    fail_puts: Arc<AtomicU32>,
    puts: Arc<AtomicU32>,
    gets: Arc<AtomicU32>,
    concurrent_puts: Arc<AtomicU32>,
    peak_concurrent_puts: Arc<AtomicU32>,
    put_delay: Option<Duration>,
    emit_progress: bool,
}

impl ScriptedNet {
    pub(crate) fn new() -> Self {
        Self {
            fail_gets: Arc::default(),
            fail_puts: Arc::default(),
            puts: Arc::default(),
            gets: Arc::default(),
            concurrent_puts: Arc::default(),
            peak_concurrent_puts: Arc::default(),
            put_delay: None,
            emit_progress: false,
        }
    }

    /// Fail the first `n` PUTs with HTTP 500.
    pub(crate) fn failing_puts(self, n: u32) -> Self {
        self.fail_puts.store(n, Ordering::SeqCst);
        self
    }

    /// Fail the first `n` proxy downloads with HTTP 502.
    pub(crate) fn failing_gets(self, n: u32) -> Self {
        self.fail_gets.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    pub(crate) fn with_progress(mut self) -> Self {
        self.emit_progress = true;
        self
    }

    pub(crate) fn puts(&self) -> u32 {
        self.puts.load(Ordering::SeqCst)
    }

    pub(crate) fn gets(&self) -> u32 {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_concurrent_puts(&self) -> u32 {
        self.peak_concurrent_puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Net for ScriptedNet {
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.fail_gets) {
            return Err(NetError::status(502, url.as_str()));
        }
        Ok(Bytes::from_static(b"\x89PNGdata"))
    }

    async fn put_bytes(
        &self,
        url: Url,
        body: Bytes,
        _content_type: &str,
        progress: Option<ProgressSink>,
    ) -> Result<(), NetError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let now = self.concurrent_puts.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_concurrent_puts.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        self.concurrent_puts.fetch_sub(1, Ordering::SeqCst);

        if take_failure(&self.fail_puts) {
            return Err(NetError::status(500, url.as_str()));
        }

        if self.emit_progress {
            if let Some(sink) = &progress {
                let total = body.len() as u64;
                sink.emit(total / 2, total);
                sink.emit(total, total);
            }
        }
        Ok(())
    }
}
