//! Storage error types

use thiserror::Error;

/// Error type for persistence operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the underlying medium failed
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored value could not be decoded
    #[error("stored value for key {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The table could not be encoded
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters the backend cannot address
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
