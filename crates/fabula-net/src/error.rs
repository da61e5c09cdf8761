use thiserror::Error;

/// Centralized error type for fabula-net.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    /// Transport-level failure: connection refused/reset, TLS, body abort.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} for URL: {url}")]
    Status {
        status: u16,
        url: String,
        /// Response body, when it could be read.
        body: Option<String>,
    },

    /// The per-request timeout elapsed.
    #[error("request timed out")]
    Timeout,
}

impl NetError {
    /// Creates a status error, discarding the body.
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
            body: None,
        }
    }

    /// HTTP status code, if this is a status error.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<reqwest::Error> for NetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error.to_string())
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;
