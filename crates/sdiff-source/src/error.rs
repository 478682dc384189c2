use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// A remote endpoint could not be reached or returned something unusable.
    #[error("request to {url} failed: {message}")]
    Retrieval {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("cannot read schema file {path}: {source}")]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema file {path} is not a valid snapshot: {source}")]
    LocalParse {
        path: PathBuf,
        #[source]
        source: sdiff_types::TypeError,
    },

    #[error("invalid transport configuration: {0}")]
    Config(String),

    #[error("cache error: {0}")]
    Cache(#[from] sdiff_store::StoreError),
}

impl SourceError {
    pub(crate) fn retrieval(url: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Retrieval {
            url: url.to_string(),
            status,
            message: message.into(),
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
