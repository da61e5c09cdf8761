use thiserror::Error;

/// Centralized error type for backend API calls.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("API request failed: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode API response: {0}")]
    Decode(String),

    /// A path could not be joined onto the configured base URL.
    #[error("invalid API URL: {0}")]
    Url(String),
}

impl ApiError {
    /// HTTP status code, if the backend answered at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Http(error.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_only_for_status_errors() {
        assert_eq!(
            ApiError::Status {
                status: 503,
                body: String::new()
            }
            .status_code(),
            Some(503)
        );
        assert_eq!(ApiError::Http("reset".into()).status_code(), None);
    }
}
