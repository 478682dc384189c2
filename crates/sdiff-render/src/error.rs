use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error at byte {offset}: {reason}")]
    Template { offset: usize, reason: String },

    #[error("unknown template placeholder {0:?}")]
    UnknownPlaceholder(String),

    #[error("cannot read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
