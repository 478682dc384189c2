use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("invalid server metadata: {0}")]
    InvalidMetadata(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type TypeResult<T> = Result<T, TypeError>;

/// Human-readable name of a JSON value's kind, used in error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
