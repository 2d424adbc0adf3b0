//! Feed API client error types.

use std::sync::Arc;

/// Errors from the feed service client.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// No feed token configured.
    #[error("missing feed token: CLIPWATCH_FEED_TOKEN not set")]
    MissingToken,

    /// Authentication failed (token rejected).
    #[error("authentication failed: feed token rejected")]
    Auth,

    /// Rate limited by the feed service.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// The user's history cannot be fetched (deleted, suspended or
    /// otherwise hidden account).
    #[error("user {user} is inaccessible")]
    UserInaccessible { user: String },

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

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FeedError::Timeout } else { FeedError::Network(Arc::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeedError::MissingToken;
        assert!(err.to_string().contains("feed token"));

        let err = FeedError::UserInaccessible { user: "ghost".to_string() };
        assert!(err.to_string().contains("ghost"));
    }
}
