use std::collections::HashMap;
use std::sync::RwLock;

use sdiff_types::{SchemaDocument, ServerMetadata};

use crate::error::StoreResult;
use crate::traits::{require_metadata, CacheStore};

/// In-memory, HashMap-based cache store.
///
/// Intended for tests and embedding. Documents are cloned on read/write.
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, SchemaDocument>>,
}

impl InMemoryCacheStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of cache keys.
    pub fn keys(&self) -> Vec<String> {
        let map = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn read(&self, meta: &ServerMetadata) -> StoreResult<Option<SchemaDocument>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(&meta.cache_key()).cloned())
    }

    fn write(&self, meta: Option<&ServerMetadata>, document: &SchemaDocument) -> StoreResult<()> {
        let meta = require_metadata(meta)?;
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(meta.cache_key(), document.clone());
        Ok(())
    }

    fn exists(&self, meta: &ServerMetadata) -> StoreResult<bool> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.contains_key(&meta.cache_key()))
    }

    fn remove(&self, meta: &ServerMetadata) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(&meta.cache_key()).is_some())
    }
}

impl std::fmt::Debug for InMemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCacheStore")
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;

    fn doc(name: &str) -> SchemaDocument {
        SchemaDocument::from_value(json!({ "schemas": [{ "singular": name }] })).unwrap()
    }

    #[test]
    fn write_then_read() {
        let store = InMemoryCacheStore::new();
        let meta = ServerMetadata::new("2.30", "abc");
        store.write(Some(&meta), &doc("user")).unwrap();

        assert_eq!(store.read(&meta).unwrap(), Some(doc("user")));
        assert_eq!(store.keys(), vec!["2.30_abc".to_string()]);
    }

    #[test]
    fn miss_is_none() {
        let store = InMemoryCacheStore::new();
        assert!(store.read(&ServerMetadata::new("2.31", "zzz")).unwrap().is_none());
    }

    #[test]
    fn missing_metadata_writes_nothing() {
        let store = InMemoryCacheStore::new();
        let err = store.write(None, &doc("user")).unwrap_err();
        assert!(matches!(err, StoreError::MissingMetadata));
        assert!(store.is_empty());
    }

    #[test]
    fn incomplete_metadata_rejected() {
        let store = InMemoryCacheStore::new();
        let err = store
            .write(Some(&ServerMetadata::new("2.30", "")), &doc("user"))
            .unwrap_err();
        assert!(matches!(err, StoreError::IncompleteMetadata { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn last_writer_wins() {
        let store = InMemoryCacheStore::new();
        let meta = ServerMetadata::new("2.30", "abc");
        store.write(Some(&meta), &doc("first")).unwrap();
        store.write(Some(&meta), &doc("second")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.read(&meta).unwrap(), Some(doc("second")));
    }

    #[test]
    fn remove_entry() {
        let store = InMemoryCacheStore::new();
        let meta = ServerMetadata::new("2.30", "abc");
        store.write(Some(&meta), &doc("user")).unwrap();
        assert!(store.exists(&meta).unwrap());
        assert!(store.remove(&meta).unwrap());
        assert!(!store.exists(&meta).unwrap());
        assert!(!store.remove(&meta).unwrap());
    }

    #[test]
    fn shared_key_across_servers() {
        let store = InMemoryCacheStore::new();
        let mut from_a = ServerMetadata::new("2.29", "x1");
        from_a.extra.insert("contextPath".into(), json!("https://a.example"));
        let mut from_b = ServerMetadata::new("2.29", "x1");
        from_b.extra.insert("contextPath".into(), json!("https://b.example"));

        store.write(Some(&from_a), &doc("user")).unwrap();
        assert_eq!(store.read(&from_b).unwrap(), Some(doc("user")));
    }
}
