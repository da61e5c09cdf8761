#![forbid(unsafe_code)]

//! Configuration for [`Pipeline`](crate::Pipeline).

use fabula_generate::PollOptions;
use fabula_net::NetOptions;
use fabula_upload::RetryPolicy;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Unified configuration for the whole pipeline.
#[derive(Clone, Debug)]
pub struct FabulaConfig {
    /// Backend base URL.
    pub base_url: Url,
    /// Bearer token attached to backend calls when present.
    pub auth_token: Option<String>,
    /// Transport options (timeouts, pooling).
    pub net: NetOptions,
    /// Client-side upload retry policy.
    pub retry: RetryPolicy,
    /// Generation polling schedule.
    pub poll: PollOptions,
    /// Cancellation token for abandoning in-flight retries and polls.
    pub cancel: Option<CancellationToken>,
    /// Events broadcast channel capacity.
    pub events_channel_capacity: usize,
}

impl FabulaConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            auth_token: None,
            net: NetOptions::default(),
            retry: RetryPolicy::default(),
            poll: PollOptions::default(),
            cancel: None,
            events_channel_capacity: 32,
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_net(mut self, net: NetOptions) -> Self {
        self.net = net;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_poll(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub fn with_events_channel_capacity(mut self, capacity: usize) -> Self {
        self.events_channel_capacity = capacity;
        self
    }
}
