use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sdiff_types::metadata::file_safe;
use sdiff_types::{SchemaDocument, SchemaSnapshot, ServerMetadata};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{require_metadata, CacheStore};

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Filesystem cache: one `{version}_{revision}.json` file per entry.
///
/// Each file holds the document's collections plus a `meta` field, so a
/// cache file can also be handed to the tool directly as a local source.
/// Files are written to a temporary sibling and renamed into place.
#[derive(Clone, Debug)]
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing the entry for `meta`.
    pub fn entry_path(&self, meta: &ServerMetadata) -> PathBuf {
        self.root.join(format!("{}.json", file_safe(&meta.cache_key())))
    }
}

impl Default for FsCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

impl CacheStore for FsCacheStore {
    fn read(&self, meta: &ServerMetadata) -> StoreResult<Option<SchemaDocument>> {
        let path = self.entry_path(meta);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "cache miss");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let snapshot = SchemaSnapshot::from_json_str(&text).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "cache hit");
        Ok(Some(snapshot.schemas))
    }

    fn write(&self, meta: Option<&ServerMetadata>, document: &SchemaDocument) -> StoreResult<()> {
        let meta = require_metadata(meta)?;
        let entry = SchemaSnapshot::entry_value(meta, document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let bytes =
            serde_json::to_vec(&entry).map_err(|e| StoreError::Serialization(e.to_string()))?;

        fs::create_dir_all(&self.root)?;
        let path = self.entry_path(meta);
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "cache entry written");
        Ok(())
    }

    fn exists(&self, meta: &ServerMetadata) -> StoreResult<bool> {
        Ok(self.entry_path(meta).is_file())
    }

    fn remove(&self, meta: &ServerMetadata) -> StoreResult<bool> {
        match fs::remove_file(self.entry_path(meta)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (FsCacheStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FsCacheStore::new(dir.path().join("cache"));
        (store, dir)
    }

    fn doc() -> SchemaDocument {
        SchemaDocument::from_value(json!({
            "schemas": [
                { "singular": "dataElement", "href": "https://a.example/api/dataElements" },
                { "singular": "indicator" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn round_trip() {
        let (store, _dir) = setup();
        let meta = ServerMetadata::new("2.30", "abc");
        store.write(Some(&meta), &doc()).unwrap();

        assert_eq!(store.read(&meta).unwrap(), Some(doc()));
    }

    #[test]
    fn unknown_metadata_is_absent() {
        let (store, _dir) = setup();
        store
            .write(Some(&ServerMetadata::new("2.30", "abc")), &doc())
            .unwrap();
        assert!(store.read(&ServerMetadata::new("2.30", "def")).unwrap().is_none());
    }

    #[test]
    fn read_before_directory_exists() {
        let (store, _dir) = setup();
        assert!(!store.root().exists());
        assert!(store.read(&ServerMetadata::new("2.30", "abc")).unwrap().is_none());
    }

    #[test]
    fn file_name_and_layout() {
        let (store, _dir) = setup();
        let meta = ServerMetadata::new("2.29", "x1");
        store.write(Some(&meta), &doc()).unwrap();

        let path = store.root().join("2.29_x1.json");
        assert!(path.is_file());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["meta"]["version"], "2.29");
        assert_eq!(raw["schemas"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn missing_metadata_writes_no_file() {
        let (store, _dir) = setup();
        let err = store.write(None, &doc()).unwrap_err();
        assert!(matches!(err, StoreError::MissingMetadata));
        assert!(!store.root().exists());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (store, _dir) = setup();
        store
            .write(Some(&ServerMetadata::new("2.30", "abc")), &doc())
            .unwrap();
        let names: Vec<String> = fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["2.30_abc.json".to_string()]);
    }

    #[test]
    fn corrupt_entry_is_an_error() {
        let (store, _dir) = setup();
        let meta = ServerMetadata::new("2.30", "abc");
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.entry_path(&meta), b"[1, 2").unwrap();

        let err = store.read(&meta).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let (store, _dir) = setup();
        let meta = ServerMetadata::new("2.30/../x", "a b");
        let path = store.entry_path(&meta);
        assert_eq!(path.file_name().unwrap(), "2.30-..-x_a-b.json");
        assert_eq!(path.parent().unwrap(), store.root());
    }

    #[test]
    fn remove_and_exists() {
        let (store, _dir) = setup();
        let meta = ServerMetadata::new("2.30", "abc");
        assert!(!store.exists(&meta).unwrap());
        store.write(Some(&meta), &doc()).unwrap();
        assert!(store.exists(&meta).unwrap());
        assert!(store.remove(&meta).unwrap());
        assert!(!store.remove(&meta).unwrap());
    }
}
