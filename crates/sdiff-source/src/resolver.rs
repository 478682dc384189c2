use std::path::Path;
use std::sync::Arc;

use sdiff_store::CacheStore;
use sdiff_types::{SchemaDocument, SchemaSnapshot, ServerMetadata};
use tracing::{info, warn};

use crate::error::{SourceError, SourceResult};
use crate::locator::{join_url, Locator};
use crate::transport::SchemaTransport;

pub const DEFAULT_INFO_ENDPOINT: &str = "/api/system/info.json";
pub const DEFAULT_SCHEMAS_ENDPOINT: &str = "/api/schemas.json";

/// Server paths appended to every remote locator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub info: String,
    pub schemas: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            info: DEFAULT_INFO_ENDPOINT.to_string(),
            schemas: DEFAULT_SCHEMAS_ENDPOINT.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Prefix for relative locators. Ignored when `absolute` is set.
    pub base_url: Option<String>,
    /// Treat every remote locator as a complete URL.
    pub absolute: bool,
    pub endpoints: Endpoints,
    /// Consult and populate the cache for remote sources.
    pub use_cache: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            absolute: false,
            endpoints: Endpoints::default(),
            use_cache: true,
        }
    }
}

/// Turns a schema location into a [`SchemaSnapshot`].
///
/// Local files are parsed directly. For servers the metadata endpoint is
/// always queried; the schema payload comes from the cache when an entry
/// for that version and revision exists, and is downloaded and cached
/// otherwise.
pub struct SchemaResolver {
    transport: Arc<dyn SchemaTransport>,
    cache: Arc<dyn CacheStore>,
    options: ResolverOptions,
}

impl SchemaResolver {
    pub fn new(
        transport: Arc<dyn SchemaTransport>,
        cache: Arc<dyn CacheStore>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            transport,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Full URL of `endpoint` on the server named by `locator`.
    pub fn endpoint_url(&self, locator: &str, endpoint: &str) -> String {
        match (&self.options.base_url, self.options.absolute) {
            (Some(base), false) => join_url(base, locator, endpoint),
            _ => join_url(locator, "", endpoint),
        }
    }

    pub async fn resolve(&self, location: &str) -> SourceResult<SchemaSnapshot> {
        match Locator::classify(location) {
            Locator::File(path) => self.load_file(&path).await,
            Locator::Remote(locator) => self.load_remote(&locator).await,
        }
    }

    /// Query the metadata endpoint of the server named by `locator`.
    pub async fn fetch_metadata(&self, locator: &str) -> SourceResult<ServerMetadata> {
        let url = self.endpoint_url(locator, &self.options.endpoints.info);
        let body = self.transport.fetch_json(&url).await?;
        ServerMetadata::from_value(body)
            .map_err(|e| SourceError::retrieval(&url, None, format!("invalid server info: {e}")))
    }

    async fn load_file(&self, path: &Path) -> SourceResult<SchemaSnapshot> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::LocalRead {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot =
            SchemaSnapshot::from_json_str(&text).map_err(|source| SourceError::LocalParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), collections = snapshot.schemas.len(), "loaded schema file");
        Ok(snapshot)
    }

    async fn load_remote(&self, locator: &str) -> SourceResult<SchemaSnapshot> {
        let meta = self.fetch_metadata(locator).await?;

        if self.options.use_cache {
            match self.cache.read(&meta) {
                Ok(Some(schemas)) => {
                    info!(key = %meta.cache_key(), "cache hit");
                    return Ok(SchemaSnapshot::new(meta, schemas));
                }
                Ok(None) => {}
                Err(e) => warn!(key = %meta.cache_key(), error = %e, "ignoring unreadable cache entry"),
            }
        }

        let url = self.endpoint_url(locator, &self.options.endpoints.schemas);
        info!(%url, version = %meta.version, revision = %meta.revision, "downloading schemas");
        let body = self.transport.fetch_json(&url).await?;
        let schemas = SchemaDocument::from_value(body)
            .map_err(|e| SourceError::retrieval(&url, None, format!("invalid schema document: {e}")))?;

        if self.options.use_cache {
            if meta.is_complete() {
                self.cache.write(Some(&meta), &schemas)?;
            } else {
                warn!(key = %meta.cache_key(), "server metadata incomplete; not caching");
            }
        }

        Ok(SchemaSnapshot::new(meta, schemas))
    }
}
