use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::SchemaDocument;
use crate::error::{kind_of, TypeError, TypeResult};
use crate::metadata::ServerMetadata;

/// Field under which metadata is attached to a persisted document.
pub const META_FIELD: &str = "meta";

/// Field holding the document in the wrapped `{meta, schemas}` layout.
const SCHEMAS_FIELD: &str = "schemas";

/// A schema document together with the metadata of the server it came from.
///
/// `meta` is `None` only for local files holding a bare document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub meta: Option<ServerMetadata>,
    pub schemas: SchemaDocument,
}

impl SchemaSnapshot {
    pub fn new(meta: ServerMetadata, schemas: SchemaDocument) -> Self {
        Self {
            meta: Some(meta),
            schemas,
        }
    }

    /// Interpret a pre-fetched JSON value.
    ///
    /// Three layouts are accepted:
    ///
    /// - `{"meta": {..}, "schemas": {..}}`: the document is the `schemas` object.
    /// - `{"meta": {..}, <collections>}`: a cache entry; `meta` is detached and
    ///   the remaining fields form the document.
    /// - any other object: a bare document with no metadata.
    pub fn from_value(value: Value) -> TypeResult<Self> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(TypeError::NotAnObject {
                    found: kind_of(&other),
                })
            }
        };

        let meta = match map.remove(META_FIELD) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(ServerMetadata::from_value(raw)?),
        };

        if meta.is_some() && map.len() == 1 {
            if let Some(Value::Object(_)) = map.get(SCHEMAS_FIELD) {
                if let Some(Value::Object(inner)) = map.remove(SCHEMAS_FIELD) {
                    return Ok(Self {
                        meta,
                        schemas: SchemaDocument::from_map(inner),
                    });
                }
            }
        }

        Ok(Self {
            meta,
            schemas: SchemaDocument::from_map(map),
        })
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json_str(text: &str) -> TypeResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Self::from_value(value)
    }

    /// The persisted form of a document: its collections plus `meta`.
    pub fn entry_value(meta: &ServerMetadata, schemas: &SchemaDocument) -> TypeResult<Value> {
        let meta_value =
            serde_json::to_value(meta).map_err(|e| TypeError::Serialization(e.to_string()))?;
        let mut map: Map<String, Value> = schemas.as_map().clone();
        map.insert(META_FIELD.to_string(), meta_value);
        Ok(Value::Object(map))
    }
}
