//! Error types for the diff crate.

/// Errors from decoding or replaying deltas.
///
/// Computing a diff never fails; only externally supplied deltas can be
/// malformed or inapplicable.
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    /// The JSON is not a valid jsondiffpatch delta.
    #[error("malformed delta at {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// The delta uses an encoding this crate does not produce.
    #[error("unsupported delta encoding at {path}: {reason}")]
    Unsupported { path: String, reason: String },

    /// The delta does not fit the value it is applied to.
    #[error("cannot apply delta at {path}: {reason}")]
    Patch { path: String, reason: String },

    /// The patched document is no longer a JSON object.
    #[error("patched document is invalid: {0}")]
    Document(#[from] sdiff_types::TypeError),
}

/// Convenience alias for diff results.
pub type DeltaResult<T> = Result<T, DeltaError>;
