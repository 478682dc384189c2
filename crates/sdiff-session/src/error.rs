use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("cannot write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("source error: {0}")]
    Source(#[from] sdiff_source::SourceError),

    #[error("render error: {0}")]
    Render(#[from] sdiff_render::RenderError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
