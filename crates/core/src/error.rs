//! Unified error types for clipwatch.

/// Errors raised by the durable stores.
///
/// Load paths deliberately swallow these (a missing or undecodable file
/// becomes an empty document); save paths surface them to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem read/write failed.
    #[error("STORE_IO: {0}")]
    Io(#[from] std::io::Error),

    /// A document failed to encode or decode as JSON.
    #[error("STORE_JSON: {0}")]
    Json(#[from] serde_json::Error),
}
