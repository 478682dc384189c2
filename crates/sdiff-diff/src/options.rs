//! Identity and field-exclusion rules.

use std::collections::BTreeSet;

use serde_json::Value;

/// Fields tried, in order, to identify a schema node.
pub const DEFAULT_IDENTITY_FIELDS: &[&str] = &["singular", "singularName", "type"];

/// Properties derived from the server's network location.
pub const DEFAULT_EXCLUDED_PROPERTIES: &[&str] = &["href", "apiEndpoint"];

/// How to compute a node's semantic identity.
///
/// The identity of an object is the value of the first candidate field that
/// is present and truthy: not null, not `false`, not `0`, not `""`. Arrays
/// and objects always count as present. Non-object values have no identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityStrategy {
    fields: Vec<String>,
}

impl IdentityStrategy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The identity value of `node`, if it has one.
    pub fn identity_of<'a>(&self, node: &'a Value) -> Option<&'a Value> {
        let map = node.as_object()?;
        self.fields
            .iter()
            .filter_map(|field| map.get(field))
            .find(|value| is_truthy(value))
    }

    /// Display label for `node`: its identity as text, if any.
    pub fn label_of(&self, node: &Value) -> Option<String> {
        self.identity_of(node).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl Default for IdentityStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_FIELDS.iter().copied())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Property names skipped at every object level during comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyFilter {
    excluded: BTreeSet<String>,
}

impl PropertyFilter {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that compares every property.
    pub fn none() -> Self {
        Self {
            excluded: BTreeSet::new(),
        }
    }

    pub fn excludes(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_PROPERTIES.iter().copied())
    }
}

/// Rules for one differ instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub identity: IdentityStrategy,
    pub filter: PropertyFilter,
}

impl DiffOptions {
    pub fn new(identity: IdentityStrategy, filter: PropertyFilter) -> Self {
        Self { identity, filter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn singular_preferred_over_type() {
        let strategy = IdentityStrategy::default();
        let node = json!({ "singular": "dataElement", "type": "DataElement" });
        assert_eq!(strategy.identity_of(&node), Some(&json!("dataElement")));
    }

    #[test]
    fn falls_back_to_type() {
        let strategy = IdentityStrategy::default();
        assert_eq!(
            strategy.identity_of(&json!({ "type": "Period" })),
            Some(&json!("Period"))
        );
        assert_eq!(
            strategy.identity_of(&json!({ "singular": "", "type": "Period" })),
            Some(&json!("Period"))
        );
        assert_eq!(
            strategy.identity_of(&json!({ "singular": null, "type": "Period" })),
            Some(&json!("Period"))
        );
    }

    #[test]
    fn singular_name_between_singular_and_type() {
        let strategy = IdentityStrategy::default();
        assert_eq!(
            strategy.identity_of(&json!({ "singularName": "user", "type": "User" })),
            Some(&json!("user"))
        );
        assert_eq!(
            strategy.identity_of(&json!({ "singular": "userRole", "singularName": "user" })),
            Some(&json!("userRole"))
        );
    }

    #[test]
    fn no_identity() {
        let strategy = IdentityStrategy::default();
        assert!(strategy.identity_of(&json!({ "name": "x" })).is_none());
        assert!(strategy.identity_of(&json!({ "type": false })).is_none());
        assert!(strategy.identity_of(&json!({ "type": 0 })).is_none());
        assert!(strategy.identity_of(&json!("dataElement")).is_none());
    }

    #[test]
    fn custom_fields_and_labels() {
        let strategy = IdentityStrategy::new(["singularName", "klass"]);
        let node = json!({ "singular": "ignored", "klass": "org.hisp.User" });
        assert_eq!(strategy.label_of(&node).as_deref(), Some("org.hisp.User"));
        assert_eq!(strategy.label_of(&json!({ "klass": 7 })).as_deref(), Some("7"));
    }

    #[test]
    fn default_filter() {
        let filter = PropertyFilter::default();
        assert!(filter.excludes("href"));
        assert!(filter.excludes("apiEndpoint"));
        assert!(!filter.excludes("hrefs"));
        assert!(!PropertyFilter::none().excludes("href"));
    }
}
