//! Replay a delta onto the value it was computed from.
//!
//! Array deltas are applied in jsondiffpatch order: removals and move sources
//! by descending left index, then insertions and move targets by ascending
//! right index, then in-place changes.

use sdiff_types::SchemaDocument;
use serde_json::Value;

use crate::delta::{ArrayChange, Delta, SchemaDelta};
use crate::error::{DeltaError, DeltaResult};

/// Apply `delta` to `left`, producing the right-hand value.
pub fn patch(left: &Value, delta: &Delta) -> DeltaResult<Value> {
    apply(left.clone(), delta, "$")
}

/// Apply a document-level delta.
pub fn patch_document(left: &SchemaDocument, delta: &SchemaDelta) -> DeltaResult<SchemaDocument> {
    match delta.to_root() {
        None => Ok(left.clone()),
        Some(root) => Ok(SchemaDocument::from_value(patch(&left.to_value(), &root)?)?),
    }
}

fn conflict(path: &str, reason: impl Into<String>) -> DeltaError {
    DeltaError::Patch {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn apply(target: Value, delta: &Delta, path: &str) -> DeltaResult<Value> {
    match delta {
        Delta::Added(value) => Ok(value.clone()),
        Delta::Modified { new, .. } => Ok(new.clone()),
        Delta::Removed(_) => Err(conflict(path, "a removal can only apply inside a container")),
        Delta::Object(entries) => {
            let Value::Object(mut map) = target else {
                return Err(conflict(path, "expected an object"));
            };
            for (key, inner) in entries {
                let inner_path = format!("{path}.{key}");
                match inner {
                    Delta::Removed(_) => {
                        map.remove(key);
                    }
                    Delta::Added(value) => {
                        map.insert(key.clone(), value.clone());
                    }
                    _ => {
                        let current = map
                            .remove(key)
                            .ok_or_else(|| conflict(&inner_path, "key is missing"))?;
                        map.insert(key.clone(), apply(current, inner, &inner_path)?);
                    }
                }
            }
            Ok(Value::Object(map))
        }
        Delta::Array(changes) => {
            let Value::Array(items) = target else {
                return Err(conflict(path, "expected an array"));
            };
            apply_array(items, changes, path).map(Value::Array)
        }
    }
}

fn apply_array(mut items: Vec<Value>, changes: &[ArrayChange], path: &str) -> DeltaResult<Vec<Value>> {
    // Left-indexed removals, each optionally re-inserted at a right index.
    let mut removals: Vec<(usize, Option<usize>)> = Vec::new();
    let mut inserts: Vec<(usize, Value)> = Vec::new();
    let mut nested: Vec<(usize, &Delta)> = Vec::new();

    for change in changes {
        match change {
            ArrayChange::Removed { index, .. } => removals.push((*index, None)),
            ArrayChange::Moved { from, to } => removals.push((*from, Some(*to))),
            ArrayChange::Inserted { index, value } => inserts.push((*index, value.clone())),
            ArrayChange::Changed { index, delta } => nested.push((*index, delta.as_ref())),
        }
    }

    removals.sort_by(|a, b| b.0.cmp(&a.0));
    for (index, target) in removals {
        if index >= items.len() {
            return Err(conflict(path, format!("left index {index} out of bounds")));
        }
        let value = items.remove(index);
        if let Some(to) = target {
            inserts.push((to, value));
        }
    }

    inserts.sort_by_key(|(index, _)| *index);
    for (index, value) in inserts {
        if index > items.len() {
            return Err(conflict(path, format!("right index {index} out of bounds")));
        }
        items.insert(index, value);
    }

    for (index, delta) in nested {
        let item_path = format!("{path}[{index}]");
        let slot = items
            .get_mut(index)
            .ok_or_else(|| conflict(&item_path, "index out of bounds"))?;
        let current = std::mem::take(slot);
        *slot = apply(current, delta, &item_path)?;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::SchemaDiffer;
    use serde_json::json;

    #[test]
    fn applies_object_changes() {
        let left = json!({ "a": 1, "b": 2, "nested": { "x": true } });
        let delta = Delta::from_json(&json!({
            "a": [1, 10],
            "b": [2, 0, 0],
            "c": ["new"],
            "nested": { "x": [true, false] }
        }))
        .unwrap();
        assert_eq!(
            patch(&left, &delta).unwrap(),
            json!({ "a": 10, "c": "new", "nested": { "x": false } })
        );
    }

    #[test]
    fn applies_array_moves_and_inserts() {
        let left = json!([{ "type": "a" }, { "type": "b" }, { "type": "c" }]);
        let delta = Delta::from_json(&json!({
            "_t": "a",
            "_0": ["", 2, 3],
            "_1": [{ "type": "b" }, 0, 0],
            "0": [{ "type": "d" }],
            "2": { "n": [1] }
        }))
        .unwrap();
        assert_eq!(
            patch(&left, &delta).unwrap(),
            json!([{ "type": "d" }, { "type": "c" }, { "type": "a", "n": 1 }])
        );
    }

    #[test]
    fn round_trips_a_computed_diff() {
        let left = SchemaDocument::from_value(json!({
            "schemas": [
                { "singular": "user", "shareable": true, "properties": [{ "name": "code" }] },
                { "singular": "orgUnit" },
                { "singular": "dataSet" }
            ]
        }))
        .unwrap();
        let right = SchemaDocument::from_value(json!({
            "schemas": [
                { "singular": "dataSet", "translatable": true },
                { "singular": "user", "shareable": false, "properties": [{ "name": "code" }, { "name": "uid" }] },
                { "singular": "program" }
            ]
        }))
        .unwrap();

        let delta = SchemaDiffer::default().diff(&left, &right);
        assert_eq!(patch_document(&left, &delta).unwrap(), right);
    }

    #[test]
    fn empty_delta_is_identity() {
        let doc = SchemaDocument::from_value(json!({ "schemas": [] })).unwrap();
        assert_eq!(patch_document(&doc, &SchemaDelta::new()).unwrap(), doc);
    }

    #[test]
    fn mismatched_target_is_an_error() {
        let delta = Delta::from_json(&json!({ "_t": "a", "_5": [1, 0, 0] })).unwrap();
        assert!(matches!(patch(&json!([1]), &delta), Err(DeltaError::Patch { .. })));

        let delta = Delta::from_json(&json!({ "a": { "b": [1, 2] } })).unwrap();
        assert!(matches!(patch(&json!({}), &delta), Err(DeltaError::Patch { .. })));
        assert!(matches!(patch(&json!(3), &delta), Err(DeltaError::Patch { .. })));
    }
}
