use std::path::PathBuf;

/// Errors from cache store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document was handed to the cache without the metadata that keys it.
    #[error("cannot cache a schema document without server metadata")]
    MissingMetadata,

    /// Metadata was supplied but cannot form a key.
    #[error("server metadata has an empty version or revision: {key:?}")]
    IncompleteMetadata { key: String },

    /// A cache entry exists but could not be decoded.
    #[error("corrupt cache entry {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
