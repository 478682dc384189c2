//! Delta model and its jsondiffpatch wire encoding.
//!
//! | Change   | Encoding                                                  |
//! |----------|-----------------------------------------------------------|
//! | added    | `[new]`                                                   |
//! | modified | `[old, new]`                                              |
//! | deleted  | `[old, 0, 0]`                                             |
//! | object   | `{ key: delta }`                                          |
//! | array    | `{ "_t": "a", "<to>": delta, "_<from>": [old, 0, 0] }`    |
//! | moved    | `"_<from>": ["", to, 3]` inside an array delta            |

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::{DeltaError, DeltaResult};

const ARRAY_MARKER_KEY: &str = "_t";
const ARRAY_MARKER: &str = "a";
const DELETED: u64 = 0;
const TEXT_DIFF: u64 = 2;
const MOVED: u64 = 3;

/// A change between two JSON values.
#[derive(Clone, Debug, PartialEq)]
pub enum Delta {
    /// The value did not exist on the left.
    Added(Value),
    /// The value was replaced.
    Modified { old: Value, new: Value },
    /// The value does not exist on the right.
    Removed(Value),
    /// Per-key changes of an object.
    Object(BTreeMap<String, Delta>),
    /// Identity-aware changes of an array.
    Array(Vec<ArrayChange>),
}

/// A single change inside an array delta.
///
/// Left indices refer to the original array, right indices to the result.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayChange {
    /// A new item at right index `index`.
    Inserted { index: usize, value: Value },
    /// The item at left index `index` is gone.
    Removed { index: usize, value: Value },
    /// The item at left index `from` now sits at right index `to`.
    Moved { from: usize, to: usize },
    /// The item now at right index `index` changed internally.
    Changed { index: usize, delta: Box<Delta> },
}

impl ArrayChange {
    /// Canonical order: left-indexed changes first, then right-indexed ones,
    /// each ascending.
    fn sort_key(&self) -> (u8, usize) {
        match self {
            ArrayChange::Removed { index, .. } => (0, *index),
            ArrayChange::Moved { from, .. } => (0, *from),
            ArrayChange::Inserted { index, .. } => (1, *index),
            ArrayChange::Changed { index, .. } => (1, *index),
        }
    }
}

/// Sort array changes into canonical order.
pub(crate) fn canonicalize(changes: &mut [ArrayChange]) {
    changes.sort_by_key(ArrayChange::sort_key);
}

impl Delta {
    /// Encode as jsondiffpatch JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Delta::Added(value) => json!([value]),
            Delta::Modified { old, new } => json!([old, new]),
            Delta::Removed(value) => json!([value, DELETED, DELETED]),
            Delta::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, delta)| (key.clone(), delta.to_json()))
                    .collect(),
            ),
            Delta::Array(changes) => {
                let mut map = Map::new();
                map.insert(ARRAY_MARKER_KEY.into(), json!(ARRAY_MARKER));
                for change in changes {
                    match change {
                        ArrayChange::Inserted { index, value } => {
                            map.insert(index.to_string(), json!([value]));
                        }
                        ArrayChange::Removed { index, value } => {
                            map.insert(format!("_{index}"), json!([value, DELETED, DELETED]));
                        }
                        ArrayChange::Moved { from, to } => {
                            map.insert(format!("_{from}"), json!(["", to, MOVED]));
                        }
                        ArrayChange::Changed { index, delta } => {
                            map.insert(index.to_string(), delta.to_json());
                        }
                    }
                }
                Value::Object(map)
            }
        }
    }

    /// Decode jsondiffpatch JSON.
    pub fn from_json(value: &Value) -> DeltaResult<Self> {
        decode(value, "$")
    }
}

fn malformed(path: &str, reason: impl Into<String>) -> DeltaError {
    DeltaError::Malformed {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn decode(value: &Value, path: &str) -> DeltaResult<Delta> {
    match value {
        Value::Array(items) => decode_marker(items, path),
        Value::Object(map) if map.get(ARRAY_MARKER_KEY) == Some(&json!(ARRAY_MARKER)) => {
            decode_array(map, path)
        }
        Value::Object(map) => {
            let mut entries = BTreeMap::new();
            for (key, inner) in map {
                entries.insert(key.clone(), decode(inner, &format!("{path}.{key}"))?);
            }
            Ok(Delta::Object(entries))
        }
        other => Err(malformed(path, format!("unexpected value {other}"))),
    }
}

fn decode_marker(items: &[Value], path: &str) -> DeltaResult<Delta> {
    match items {
        [value] => Ok(Delta::Added(value.clone())),
        [old, new] => Ok(Delta::Modified {
            old: old.clone(),
            new: new.clone(),
        }),
        [old, a, b] if a.as_u64() == Some(DELETED) && b.as_u64() == Some(DELETED) => {
            Ok(Delta::Removed(old.clone()))
        }
        [_, _, code] if code.as_u64() == Some(TEXT_DIFF) => Err(DeltaError::Unsupported {
            path: path.to_string(),
            reason: "text diffs are not supported".into(),
        }),
        [_, _, code] if code.as_u64() == Some(MOVED) => {
            Err(malformed(path, "move marker outside of an array delta"))
        }
        _ => Err(malformed(path, format!("unrecognised marker of length {}", items.len()))),
    }
}

fn decode_array(map: &Map<String, Value>, path: &str) -> DeltaResult<Delta> {
    let mut changes = Vec::new();
    for (key, inner) in map {
        if key == ARRAY_MARKER_KEY {
            continue;
        }
        let item_path = format!("{path}[{key}]");
        if let Some(left) = key.strip_prefix('_') {
            let from: usize = left
                .parse()
                .map_err(|_| malformed(&item_path, "invalid left index"))?;
            let items = inner
                .as_array()
                .ok_or_else(|| malformed(&item_path, "expected a marker array"))?;
            match items.as_slice() {
                [old, a, b] if a.as_u64() == Some(DELETED) && b.as_u64() == Some(DELETED) => {
                    changes.push(ArrayChange::Removed {
                        index: from,
                        value: old.clone(),
                    });
                }
                [_, to, code] if code.as_u64() == Some(MOVED) => {
                    let to = to
                        .as_u64()
                        .ok_or_else(|| malformed(&item_path, "invalid move target"))?;
                    changes.push(ArrayChange::Moved {
                        from,
                        to: to as usize,
                    });
                }
                _ => return Err(malformed(&item_path, "expected a removal or move")),
            }
        } else {
            let index: usize = key
                .parse()
                .map_err(|_| malformed(&item_path, "invalid right index"))?;
            match inner {
                Value::Array(items) if items.len() == 1 => changes.push(ArrayChange::Inserted {
                    index,
                    value: items[0].clone(),
                }),
                _ => changes.push(ArrayChange::Changed {
                    index,
                    delta: Box::new(decode(inner, &item_path)?),
                }),
            }
        }
    }
    canonicalize(&mut changes);
    Ok(Delta::Array(changes))
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Delta::from_json(&value).map_err(D::Error::custom)
    }
}

/// Counts of leaf changes in a delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeltaStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub moved: usize,
}

impl DeltaStats {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified + self.moved
    }

    fn record(&mut self, delta: &Delta) {
        match delta {
            Delta::Added(_) => self.added += 1,
            Delta::Removed(_) => self.removed += 1,
            Delta::Modified { .. } => self.modified += 1,
            Delta::Object(entries) => entries.values().for_each(|d| self.record(d)),
            Delta::Array(changes) => {
                for change in changes {
                    match change {
                        ArrayChange::Inserted { .. } => self.added += 1,
                        ArrayChange::Removed { .. } => self.removed += 1,
                        ArrayChange::Moved { .. } => self.moved += 1,
                        ArrayChange::Changed { delta, .. } => self.record(delta),
                    }
                }
            }
        }
    }
}

/// The difference between two schema documents, keyed by collection.
///
/// An empty delta means the documents are semantically identical.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaDelta {
    /// Changes per top-level collection key.
    pub changes: BTreeMap<String, Delta>,
}

impl SchemaDelta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of collections with changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Delta of a single collection.
    pub fn collection(&self, key: &str) -> Option<&Delta> {
        self.changes.get(key)
    }

    /// Leaf change counts across all collections.
    pub fn stats(&self) -> DeltaStats {
        let mut stats = DeltaStats::default();
        self.changes.values().for_each(|d| stats.record(d));
        stats
    }

    /// Root delta as a single value, `None` when empty.
    pub fn to_root(&self) -> Option<Delta> {
        (!self.is_empty()).then(|| Delta::Object(self.changes.clone()))
    }

    /// jsondiffpatch encoding; an empty delta encodes as `{}`.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.changes
                .iter()
                .map(|(key, delta)| (key.clone(), delta.to_json()))
                .collect(),
        )
    }

    /// Decode a document-level delta. `null` and `{}` are empty.
    pub fn from_json(value: &Value) -> DeltaResult<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) if map.get(ARRAY_MARKER_KEY).is_none() => {
                let mut changes = BTreeMap::new();
                for (key, inner) in map {
                    changes.insert(key.clone(), decode(inner, &format!("$.{key}"))?);
                }
                Ok(Self { changes })
            }
            _ => Err(malformed("$", "a document delta must be an object")),
        }
    }
}

impl Serialize for SchemaDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaDelta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SchemaDelta::from_json(&value).map_err(D::Error::custom)
    }
}
