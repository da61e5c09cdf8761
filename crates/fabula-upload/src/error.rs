use fabula_api::ApiError;
use fabula_net::NetError;
use thiserror::Error;

/// Failures of the upload pipeline.
///
/// `Fetch`, `Put`, and `Api` are per-attempt failures and stay inside the
/// retry loop until the budget is spent; `RetryExhausted` triggers the
/// server-side escalation; `Failed` is terminal and always surfaced.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Downloading the source through the backend proxy failed.
    #[error("source download failed: {0}")]
    Fetch(#[source] NetError),

    /// The presigned PUT failed.
    #[error("storage upload failed: {0}")]
    Put(#[source] NetError),

    /// A backend call (presign, resource update) failed.
    #[error("backend call failed: {0}")]
    Api(#[from] ApiError),

    /// All client-side attempts were spent.
    #[error("upload failed after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<UploadError>,
    },

    /// Client retries and the server-side compensating upload both failed.
    /// The resource stays visibly failed until the user retries manually.
    #[error("upload failed permanently: {source}")]
    Failed {
        #[source]
        source: Box<UploadError>,
    },

    /// The caller abandoned the upload.
    #[error("upload cancelled")]
    Cancelled,
}

impl UploadError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nests_the_cause_chain() {
        let error = UploadError::RetryExhausted {
            attempts: 3,
            source: Box::new(UploadError::Put(NetError::status(500, "http://x/"))),
        };
        assert_eq!(
            error.to_string(),
            "upload failed after 3 attempts: storage upload failed: HTTP 500 for URL: http://x/"
        );
    }

    #[test]
    fn terminal_classification() {
        let terminal = UploadError::Failed {
            source: Box::new(UploadError::Cancelled),
        };
        assert!(terminal.is_terminal());
        assert!(!UploadError::Cancelled.is_terminal());
        assert!(UploadError::Cancelled.is_cancelled());
    }
}
