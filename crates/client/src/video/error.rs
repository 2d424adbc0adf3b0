//! Video API client error types.

use std::sync::Arc;

/// Errors from the video data API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VideoError {
    /// The video or channel does not exist.
    #[error("not found")]
    NotFound,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for VideoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VideoError::Timeout
        } else if err.is_decode() {
            VideoError::Parse(err.to_string())
        } else {
            VideoError::Network(Arc::new(err))
        }
    }
}
