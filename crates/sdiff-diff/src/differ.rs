//! Structural diff with identity-based array matching.
//!
//! Arrays are compared the way jsondiffpatch compares them: the common head
//! and tail are trimmed, the longest common subsequence of the remaining
//! middle is kept in place, and every unmatched left item that matches an
//! unmatched right item becomes a move rather than a remove/add pair.

use std::collections::BTreeMap;

use sdiff_types::SchemaDocument;
use serde_json::{Map, Value};

use crate::delta::{canonicalize, ArrayChange, Delta, SchemaDelta};
use crate::options::DiffOptions;

/// Computes semantic deltas between schema documents.
#[derive(Clone, Debug, Default)]
pub struct SchemaDiffer {
    options: DiffOptions,
}

impl SchemaDiffer {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compare two documents collection by collection.
    pub fn diff(&self, left: &SchemaDocument, right: &SchemaDocument) -> SchemaDelta {
        match self.diff_objects(left.as_map(), right.as_map()) {
            Some(Delta::Object(changes)) => SchemaDelta { changes },
            _ => SchemaDelta::new(),
        }
    }

    /// Compare two arbitrary JSON values. `None` means no semantic change.
    pub fn diff_values(&self, left: &Value, right: &Value) -> Option<Delta> {
        match (left, right) {
            (Value::Object(a), Value::Object(b)) => self.diff_objects(a, b),
            (Value::Array(a), Value::Array(b)) => self.diff_arrays(a, b),
            _ if left == right => None,
            _ => Some(Delta::Modified {
                old: left.clone(),
                new: right.clone(),
            }),
        }
    }

    /// Deep equality that ignores excluded properties.
    pub fn semantically_equal(&self, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Object(a), Value::Object(b)) => {
                let filter = &self.options.filter;
                let kept = |map: &Map<String, Value>| map.keys().filter(|k| !filter.excludes(k)).count();
                kept(a) == kept(b)
                    && a.iter()
                        .filter(|(k, _)| !filter.excludes(k))
                        .all(|(k, v)| b.get(k).is_some_and(|w| self.semantically_equal(v, w)))
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(v, w)| self.semantically_equal(v, w))
            }
            _ => left == right,
        }
    }

    fn diff_objects(&self, left: &Map<String, Value>, right: &Map<String, Value>) -> Option<Delta> {
        let filter = &self.options.filter;
        let mut changes = BTreeMap::new();

        for (key, old) in left {
            if filter.excludes(key) {
                continue;
            }
            match right.get(key) {
                Some(new) => {
                    if let Some(delta) = self.diff_values(old, new) {
                        changes.insert(key.clone(), delta);
                    }
                }
                None => {
                    changes.insert(key.clone(), Delta::Removed(old.clone()));
                }
            }
        }

        for (key, new) in right {
            if !filter.excludes(key) && !left.contains_key(key) {
                changes.insert(key.clone(), Delta::Added(new.clone()));
            }
        }

        (!changes.is_empty()).then_some(Delta::Object(changes))
    }

    fn diff_arrays(&self, left: &[Value], right: &[Value]) -> Option<Delta> {
        let matcher = Matcher::new(self, left, right);
        let mut changes = Vec::new();

        let mut head = 0;
        while head < left.len() && head < right.len() && matcher.matches(head, head) {
            self.push_nested(&mut changes, &left[head], &right[head], head);
            head += 1;
        }

        let (mut end1, mut end2) = (left.len(), right.len());
        while end1 > head && end2 > head && matcher.matches(end1 - 1, end2 - 1) {
            self.push_nested(&mut changes, &left[end1 - 1], &right[end2 - 1], end2 - 1);
            end1 -= 1;
            end2 -= 1;
        }

        let common = matcher.lcs(head..end1, head..end2);
        let mut kept_left = vec![false; end1 - head];
        let mut kept_right = vec![false; end2 - head];
        for &(i1, i2) in &common {
            kept_left[i1 - head] = true;
            kept_right[i2 - head] = true;
            self.push_nested(&mut changes, &left[i1], &right[i2], i2);
        }

        let mut added: Vec<usize> = (head..end2).filter(|&i| !kept_right[i - head]).collect();
        for i1 in (head..end1).filter(|&i| !kept_left[i - head]) {
            match added.iter().position(|&i2| matcher.matches(i1, i2)) {
                Some(pos) => {
                    let i2 = added.remove(pos);
                    changes.push(ArrayChange::Moved { from: i1, to: i2 });
                    self.push_nested(&mut changes, &left[i1], &right[i2], i2);
                }
                None => changes.push(ArrayChange::Removed {
                    index: i1,
                    value: left[i1].clone(),
                }),
            }
        }
        for i2 in added {
            changes.push(ArrayChange::Inserted {
                index: i2,
                value: right[i2].clone(),
            });
        }

        if changes.is_empty() {
            return None;
        }
        canonicalize(&mut changes);
        Some(Delta::Array(changes))
    }

    fn push_nested(&self, changes: &mut Vec<ArrayChange>, old: &Value, new: &Value, index: usize) {
        if let Some(delta) = self.diff_values(old, new) {
            changes.push(ArrayChange::Changed {
                index,
                delta: Box::new(delta),
            });
        }
    }
}

/// Item matching for one pair of arrays, with identities computed once.
struct Matcher<'a> {
    differ: &'a SchemaDiffer,
    left: &'a [Value],
    right: &'a [Value],
    left_ids: Vec<Option<&'a Value>>,
    right_ids: Vec<Option<&'a Value>>,
}

impl<'a> Matcher<'a> {
    fn new(differ: &'a SchemaDiffer, left: &'a [Value], right: &'a [Value]) -> Self {
        let identity = &differ.options.identity;
        Self {
            differ,
            left,
            right,
            left_ids: left.iter().map(|v| identity.identity_of(v)).collect(),
            right_ids: right.iter().map(|v| identity.identity_of(v)).collect(),
        }
    }

    /// Same logical entity: equal identities, or equal content when either
    /// side has no identity.
    fn matches(&self, i1: usize, i2: usize) -> bool {
        match (self.left_ids[i1], self.right_ids[i2]) {
            (Some(a), Some(b)) => a == b,
            _ => self.differ.semantically_equal(&self.left[i1], &self.right[i2]),
        }
    }

    /// Longest common subsequence of two index ranges, as ascending pairs.
    fn lcs(&self, r1: std::ops::Range<usize>, r2: std::ops::Range<usize>) -> Vec<(usize, usize)> {
        let (n, m) = (r1.len(), r2.len());
        if n == 0 || m == 0 {
            return Vec::new();
        }

        let mut table = vec![vec![0u32; m + 1]; n + 1];
        for i in 1..=n {
            for j in 1..=m {
                table[i][j] = if self.matches(r1.start + i - 1, r2.start + j - 1) {
                    table[i - 1][j - 1] + 1
                } else {
                    table[i - 1][j].max(table[i][j - 1])
                };
            }
        }

        let mut pairs = Vec::with_capacity(table[n][m] as usize);
        let (mut i, mut j) = (n, m);
        while i > 0 && j > 0 {
            if self.matches(r1.start + i - 1, r2.start + j - 1) {
                pairs.push((r1.start + i - 1, r2.start + j - 1));
                i -= 1;
                j -= 1;
            } else if table[i][j - 1] > table[i - 1][j] {
                j -= 1;
            } else {
                i -= 1;
            }
        }
        pairs.reverse();
        pairs
    }
}
