//! Human-oriented summary of a schema delta.

use std::collections::BTreeMap;

use sdiff_types::SchemaDocument;
use serde::Serialize;
use serde_json::Value;

use crate::delta::{ArrayChange, Delta, DeltaStats, SchemaDelta};
use crate::options::IdentityStrategy;

/// What happened to one top-level collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CollectionChange {
    /// The collection exists only on the right.
    Added,
    /// The collection exists only on the left.
    Removed,
    /// The value was replaced outright, e.g. an array became an object.
    Replaced,
    /// Fields inside an object-valued collection changed.
    Changed,
    /// Node-level changes inside an array collection.
    Nodes(NodeChanges),
}

/// Node labels grouped by kind of change.
///
/// Labels are node identities; nodes without one are labelled `#<index>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodeChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub moved: Vec<String>,
}

/// Per-collection report of a [`SchemaDelta`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub collections: BTreeMap<String, CollectionChange>,
    pub totals: DeltaStats,
}

impl ChangeReport {
    /// Summarise `delta`, which must have been computed from `left` to `right`.
    pub fn build(
        left: &SchemaDocument,
        right: &SchemaDocument,
        delta: &SchemaDelta,
        identity: &IdentityStrategy,
    ) -> Self {
        let collections = delta
            .changes
            .iter()
            .map(|(key, change)| {
                let summary = match change {
                    Delta::Added(_) => CollectionChange::Added,
                    Delta::Removed(_) => CollectionChange::Removed,
                    Delta::Array(changes) => CollectionChange::Nodes(node_changes(
                        left.collection(key).unwrap_or_default(),
                        right.collection(key).unwrap_or_default(),
                        changes,
                        identity,
                    )),
                    Delta::Modified { .. } => CollectionChange::Replaced,
                    Delta::Object(_) => CollectionChange::Changed,
                };
                (key.clone(), summary)
            })
            .collect();

        Self {
            collections,
            totals: delta.stats(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

fn node_changes(
    left: &[Value],
    right: &[Value],
    changes: &[ArrayChange],
    identity: &IdentityStrategy,
) -> NodeChanges {
    let label = |nodes: &[Value], index: usize| {
        nodes
            .get(index)
            .and_then(|node| identity.label_of(node))
            .unwrap_or_else(|| format!("#{index}"))
    };

    let mut summary = NodeChanges::default();
    for change in changes {
        match change {
            ArrayChange::Inserted { index, .. } => summary.added.push(label(right, *index)),
            ArrayChange::Removed { index, .. } => summary.removed.push(label(left, *index)),
            ArrayChange::Moved { from, .. } => summary.moved.push(label(left, *from)),
            ArrayChange::Changed { index, .. } => summary.modified.push(label(right, *index)),
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::SchemaDiffer;
    use serde_json::json;

    #[test]
    fn labels_nodes_by_identity() {
        let left = SchemaDocument::from_value(json!({
            "schemas": [
                { "singular": "user", "shareable": true },
                { "singular": "orgUnit" },
                { "singular": "legacy" },
                { "name": "anonymous" }
            ],
            "dropped": []
        }))
        .unwrap();
        let right = SchemaDocument::from_value(json!({
            "schemas": [
                { "singular": "orgUnit" },
                { "singular": "user", "shareable": false },
                { "singular": "program" }
            ],
            "meta2": {}
        }))
        .unwrap();

        let identity = IdentityStrategy::default();
        let delta = SchemaDiffer::default().diff(&left, &right);
        let report = ChangeReport::build(&left, &right, &delta, &identity);

        assert_eq!(report.collections.get("dropped"), Some(&CollectionChange::Removed));
        assert_eq!(report.collections.get("meta2"), Some(&CollectionChange::Added));

        let Some(CollectionChange::Nodes(nodes)) = report.collections.get("schemas") else {
            panic!("expected node changes");
        };
        assert_eq!(nodes.added, vec!["program"]);
        assert_eq!(nodes.modified, vec!["user"]);
        assert!(nodes.removed.contains(&"legacy".to_string()));
        assert!(nodes.removed.contains(&"#3".to_string()));
        assert_eq!(nodes.moved.len(), 1);
        assert_eq!(report.totals, delta.stats());
    }

    #[test]
    fn object_collections_changed_not_replaced() {
        let left = SchemaDocument::from_value(json!({
            "settings": { "a": 1 },
            "kinds": [1]
        }))
        .unwrap();
        let right = SchemaDocument::from_value(json!({
            "settings": { "a": 2 },
            "kinds": { "a": 1 }
        }))
        .unwrap();

        let delta = SchemaDiffer::default().diff(&left, &right);
        let report = ChangeReport::build(&left, &right, &delta, &IdentityStrategy::default());

        assert_eq!(report.collections.get("settings"), Some(&CollectionChange::Changed));
        assert_eq!(report.collections.get("kinds"), Some(&CollectionChange::Replaced));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["collections"]["settings"]["kind"], "changed");
    }

    #[test]
    fn empty_delta_empty_report() {
        let doc = SchemaDocument::from_value(json!({ "schemas": [{ "singular": "a" }] })).unwrap();
        let delta = SchemaDiffer::default().diff(&doc, &doc);
        let report = ChangeReport::build(&doc, &doc, &delta, &IdentityStrategy::default());
        assert!(report.is_empty());
        assert_eq!(report.totals.total(), 0);
    }

    #[test]
    fn serializes_with_kind_tags() {
        let mut report = ChangeReport::default();
        report.collections.insert("x".into(), CollectionChange::Added);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["collections"]["x"]["kind"], "added");
    }
}
