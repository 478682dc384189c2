use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TypeError, TypeResult};

/// Placeholder used in derived names when one side has no metadata.
pub const UNKNOWN: &str = "unknown";

/// Version information reported by a schema server's info endpoint.
///
/// `version` and `revision` together identify a schema snapshot. Any other
/// fields the server reports (build time, server date, ...) are kept in
/// `extra` and round-trip unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerMetadata {
    pub version: String,
    pub revision: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerMetadata {
    pub fn new(version: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            revision: revision.into(),
            extra: Map::new(),
        }
    }

    /// Parse metadata from an info endpoint response.
    pub fn from_value(value: Value) -> TypeResult<Self> {
        serde_json::from_value(value).map_err(|e| TypeError::InvalidMetadata(e.to_string()))
    }

    /// Deterministic cache key: `{version}_{revision}`.
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.version, self.revision)
    }

    /// Both identifying fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.version.is_empty() && !self.revision.is_empty()
    }

    /// Name for a comparison of two snapshots:
    /// `{version1}_{revision1}__{version2}_{revision2}`.
    pub fn diff_key(left: Option<&Self>, right: Option<&Self>) -> String {
        let key = |meta: Option<&Self>| {
            meta.map(Self::cache_key)
                .unwrap_or_else(|| format!("{UNKNOWN}_{UNKNOWN}"))
        };
        format!("{}__{}", key(left), key(right))
    }
}

/// Replace characters outside `[A-Za-z0-9._-]` with `-`.
///
/// Keys are built from server responses; this keeps them usable as file names.
pub fn file_safe(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

impl fmt::Display for ServerMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rev {})", self.version, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cache_key_joins_version_and_revision() {
        let meta = ServerMetadata::new("2.30", "abc");
        assert_eq!(meta.cache_key(), "2.30_abc");
    }

    #[test]
    fn extra_fields_round_trip() {
        let raw = json!({
            "version": "2.29",
            "revision": "x1",
            "buildTime": "2018-03-01T10:00:00.000",
            "serverDate": "2018-04-01T10:00:00.000"
        });
        let meta = ServerMetadata::from_value(raw.clone()).unwrap();
        assert_eq!(meta.version, "2.29");
        assert_eq!(meta.extra.len(), 2);
        assert_eq!(serde_json::to_value(&meta).unwrap(), raw);
    }

    #[test]
    fn missing_revision_is_rejected() {
        let err = ServerMetadata::from_value(json!({ "version": "2.29" })).unwrap_err();
        assert!(matches!(err, TypeError::InvalidMetadata(_)));
    }

    #[test]
    fn diff_key_uses_placeholder_for_missing_side() {
        let left = ServerMetadata::new("2.29", "x1");
        assert_eq!(
            ServerMetadata::diff_key(Some(&left), None),
            "2.29_x1__unknown_unknown"
        );
        let right = ServerMetadata::new("2.30", "y2");
        assert_eq!(
            ServerMetadata::diff_key(Some(&left), Some(&right)),
            "2.29_x1__2.30_y2"
        );
    }

    #[test]
    fn file_safe_replaces_separators() {
        assert_eq!(file_safe("2.31-SNAPSHOT_a/b c"), "2.31-SNAPSHOT_a-b-c");
        assert_eq!(file_safe("2.29_x1__2.30_y2"), "2.29_x1__2.30_y2");
    }

    #[test]
    fn completeness() {
        assert!(ServerMetadata::new("2.29", "x1").is_complete());
        assert!(!ServerMetadata::new("", "x1").is_complete());
        assert!(!ServerMetadata::new("2.29", "").is_complete());
    }
}
