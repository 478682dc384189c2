//! Session configuration.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [remote]
//! default_base_url = "https://play.dhis2.org"
//! info_endpoint = "/api/system/info.json"
//! schemas_endpoint = "/api/schemas.json"
//! timeout_secs = 60
//!
//! [remote.headers]
//! x-requested-with = "XMLHttpRequest"
//!
//! [cache]
//! dir = "cache"
//! enabled = true
//!
//! [identity]
//! fields = ["singular", "singularName", "type"]
//! excluded_properties = ["href", "apiEndpoint"]
//!
//! [render]
//! output_dir = "."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sdiff_diff::{DiffOptions, IdentityStrategy, PropertyFilter};
use sdiff_source::{Credentials, Endpoints, HttpOptions};
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

/// Schema server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL used when `--base-url` is given without a value.
    #[serde(default = "default_base_url")]
    pub default_base_url: Option<String>,

    #[serde(default = "default_info_endpoint")]
    pub info_endpoint: String,

    #[serde(default = "default_schemas_endpoint")]
    pub schemas_endpoint: String,

    /// Headers sent with every request.
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Node identity and comparison rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Candidate identity fields, most preferred first.
    #[serde(default = "default_identity_fields")]
    pub fields: Vec<String>,

    /// Properties ignored at every level of comparison.
    #[serde(default = "default_excluded_properties")]
    pub excluded_properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Custom HTML template; the built-in page is used when unset.
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Directory for visualizations with a derived file name.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_base_url() -> Option<String> {
    Some("https://play.dhis2.org".to_string())
}

fn default_info_endpoint() -> String {
    sdiff_source::DEFAULT_INFO_ENDPOINT.to_string()
}

fn default_schemas_endpoint() -> String {
    sdiff_source::DEFAULT_SCHEMAS_ENDPOINT.to_string()
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("x-requested-with".to_string(), "XMLHttpRequest".to_string())])
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(sdiff_store::fs::DEFAULT_CACHE_DIR)
}

fn default_true() -> bool {
    true
}

fn default_identity_fields() -> Vec<String> {
    sdiff_diff::options::DEFAULT_IDENTITY_FIELDS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_properties() -> Vec<String> {
    sdiff_diff::options::DEFAULT_EXCLUDED_PROPERTIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            default_base_url: default_base_url(),
            info_endpoint: default_info_endpoint(),
            schemas_endpoint: default_schemas_endpoint(),
            headers: default_headers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            enabled: true,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            fields: default_identity_fields(),
            excluded_properties: default_excluded_properties(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template: None,
            output_dir: default_output_dir(),
        }
    }
}

impl DiffConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| SessionError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> SessionResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SessionResult<()> {
        if self.identity.fields.is_empty() {
            return Err(SessionError::Config(
                "identity.fields must name at least one field".into(),
            ));
        }
        if self.remote.timeout_secs == 0 {
            return Err(SessionError::Config("remote.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions::new(
            IdentityStrategy::new(self.identity.fields.iter().cloned()),
            PropertyFilter::new(self.identity.excluded_properties.iter().cloned()),
        )
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            info: self.remote.info_endpoint.clone(),
            schemas: self.remote.schemas_endpoint.clone(),
        }
    }

    pub fn http_options(&self, credentials: Option<Credentials>) -> HttpOptions {
        HttpOptions {
            headers: self.remote.headers.clone(),
            timeout: Some(Duration::from_secs(self.remote.timeout_secs)),
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DiffConfig::from_toml_str("").unwrap();
        assert_eq!(config, DiffConfig::default());
        assert_eq!(config.cache.dir, PathBuf::from("cache"));
        assert!(config.cache.enabled);
        assert_eq!(config.identity.fields, vec!["singular", "singularName", "type"]);
        assert_eq!(
            config.remote.headers.get("x-requested-with").map(String::as_str),
            Some("XMLHttpRequest")
        );
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DiffConfig::from_toml_str(
            r#"
            [cache]
            enabled = false

            [identity]
            fields = ["singularName", "klass"]
            "#,
        )
        .unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.dir, PathBuf::from("cache"));
        assert_eq!(config.identity.excluded_properties, vec!["href", "apiEndpoint"]);

        let options = config.diff_options();
        assert_eq!(
            options.identity.label_of(&json!({ "klass": "User" })).as_deref(),
            Some("User")
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            DiffConfig::from_toml_str("[identity]\nfields = []"),
            Err(SessionError::Config(_))
        ));
        assert!(matches!(
            DiffConfig::from_toml_str("[remote]\ntimeout_secs = 0"),
            Err(SessionError::Config(_))
        ));
        assert!(matches!(
            DiffConfig::from_toml_str("[cache]\nenabled = \"yes\""),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sdiff.toml");
        std::fs::write(&path, "[render]\noutput_dir = \"reports\"\n").unwrap();
        let config = DiffConfig::load(&path).unwrap();
        assert_eq!(config.render.output_dir, PathBuf::from("reports"));

        assert!(matches!(
            DiffConfig::load(&dir.path().join("missing.toml")),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn http_options_carry_timeout_and_credentials() {
        let config = DiffConfig::default();
        let options = config.http_options(Some(Credentials::new("admin", "secret")));
        assert_eq!(options.timeout, Some(Duration::from_secs(60)));
        assert_eq!(options.credentials.unwrap().username, "admin");
        assert_eq!(config.endpoints(), Endpoints::default());
    }
}
