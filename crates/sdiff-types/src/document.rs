use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{kind_of, TypeError, TypeResult};

/// The full set of schema definitions exposed by one server version.
///
/// A document maps collection keys (usually just `schemas`) to arrays of
/// schema nodes. It is otherwise opaque: only the differ looks inside the
/// nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument(Map<String, Value>);

impl SchemaDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a document from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> TypeResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TypeError::NotAnObject {
                found: kind_of(&other),
            }),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Clone the document into a plain JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Insert or replace a collection.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// The nodes of a collection, if the key exists and holds an array.
    pub fn collection(&self, key: &str) -> Option<&[Value]> {
        self.0.get(key).and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Keys of every collection in the document.
    pub fn collection_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Total number of nodes across all array-valued collections.
    pub fn node_count(&self) -> usize {
        self.0
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<SchemaDocument> for Value {
    fn from(doc: SchemaDocument) -> Self {
        doc.into_value()
    }
}

impl TryFrom<Value> for SchemaDocument {
    type Error = TypeError;

    fn try_from(value: Value) -> TypeResult<Self> {
        Self::from_value(value)
    }
}
