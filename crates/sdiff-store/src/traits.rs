use sdiff_types::{SchemaDocument, ServerMetadata};

use crate::error::{StoreError, StoreResult};

/// Persistent cache of schema documents keyed by server metadata.
///
/// Implementations must satisfy:
/// - `read` returns `Ok(None)` on a miss.
/// - `write` with `None` metadata fails with [`StoreError::MissingMetadata`]
///   and leaves the cache untouched.
/// - Last writer wins for a given key.
pub trait CacheStore: Send + Sync {
    /// Look up the document cached for `meta`.
    fn read(&self, meta: &ServerMetadata) -> StoreResult<Option<SchemaDocument>>;

    /// Cache `document` under the key derived from `meta`.
    fn write(&self, meta: Option<&ServerMetadata>, document: &SchemaDocument) -> StoreResult<()>;

    /// Check whether an entry exists for `meta`.
    fn exists(&self, meta: &ServerMetadata) -> StoreResult<bool> {
        Ok(self.read(meta)?.is_some())
    }

    /// Remove the entry for `meta`. Returns `true` if one existed.
    fn remove(&self, meta: &ServerMetadata) -> StoreResult<bool>;
}

/// Shared precondition for every backend's `write`.
pub(crate) fn require_metadata(meta: Option<&ServerMetadata>) -> StoreResult<&ServerMetadata> {
    let meta = meta.ok_or(StoreError::MissingMetadata)?;
    if !meta.is_complete() {
        return Err(StoreError::IncompleteMetadata {
            key: meta.cache_key(),
        });
    }
    Ok(meta)
}
