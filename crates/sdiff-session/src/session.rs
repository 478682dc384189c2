use std::path::{Path, PathBuf};
use std::sync::Arc;

use sdiff_diff::{SchemaDelta, SchemaDiffer};
use sdiff_render::{HtmlRenderer, RenderContext, Renderer};
use sdiff_source::{
    Credentials, HttpTransport, ResolverOptions, SchemaResolver, SchemaTransport,
};
use sdiff_store::{CacheStore, FsCacheStore};
use sdiff_types::metadata::file_safe;
use sdiff_types::{SchemaSnapshot, ServerMetadata};
use tracing::info;

use crate::config::DiffConfig;
use crate::error::{SessionError, SessionResult};
use crate::request::{DiffSessionRequest, VisualizationTarget};

/// Result of a diff run.
#[derive(Clone, Debug)]
pub struct SessionOutcome {
    pub delta: SchemaDelta,
    pub left: SchemaSnapshot,
    pub right: SchemaSnapshot,
    /// Where the raw delta was written, if requested.
    pub output_path: Option<PathBuf>,
    /// Where the visualization was written, if requested.
    pub visualization_path: Option<PathBuf>,
}

/// Runs diff requests: resolves both sources concurrently, diffs them, and
/// writes the requested artifacts.
pub struct DiffSession {
    config: DiffConfig,
    transport: Arc<dyn SchemaTransport>,
    cache: Arc<dyn CacheStore>,
    renderer: Arc<dyn Renderer>,
    differ: SchemaDiffer,
}

impl DiffSession {
    pub fn new(
        config: DiffConfig,
        transport: Arc<dyn SchemaTransport>,
        cache: Arc<dyn CacheStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let differ = SchemaDiffer::new(config.diff_options());
        Self {
            config,
            transport,
            cache,
            renderer,
            differ,
        }
    }

    /// Session over HTTP, the filesystem cache and the HTML renderer.
    pub fn from_config(config: DiffConfig, credentials: Option<Credentials>) -> SessionResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.http_options(credentials))?;
        let cache = FsCacheStore::new(config.cache.dir.clone());
        let renderer = match &config.render.template {
            Some(path) => HtmlRenderer::from_file(path)?,
            None => HtmlRenderer::new()?,
        };
        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(cache),
            Arc::new(renderer),
        ))
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn differ(&self) -> &SchemaDiffer {
        &self.differ
    }

    fn resolver(&self, request: &DiffSessionRequest) -> SchemaResolver {
        SchemaResolver::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.cache),
            ResolverOptions {
                base_url: request.effective_base_url().map(str::to_string),
                absolute: request.absolute,
                endpoints: self.config.endpoints(),
                use_cache: self.config.cache.enabled,
            },
        )
    }

    pub async fn run(&self, request: &DiffSessionRequest) -> SessionResult<SessionOutcome> {
        request.validate()?;

        let resolver = self.resolver(request);
        let (left, right) = tokio::try_join!(
            resolver.resolve(&request.source1),
            resolver.resolve(&request.source2),
        )?;

        let delta = self.differ.diff(&left.schemas, &right.schemas);
        info!(
            left = %describe(left.meta.as_ref()),
            right = %describe(right.meta.as_ref()),
            changed_collections = delta.len(),
            "computed delta"
        );

        let visualization_path = match &request.visualization {
            Some(target) => Some(self.write_visualization(target, &left, &right, &delta).await?),
            None => None,
        };

        let output_path = match &request.output_path {
            Some(path) => {
                self.write_delta(path, &delta).await?;
                Some(path.clone())
            }
            None => None,
        };

        Ok(SessionOutcome {
            delta,
            left,
            right,
            output_path,
            visualization_path,
        })
    }

    /// File name for a derived visualization of `left` against `right`.
    pub fn derived_visualization_path(
        &self,
        left: Option<&ServerMetadata>,
        right: Option<&ServerMetadata>,
    ) -> PathBuf {
        let stem = file_safe(&ServerMetadata::diff_key(left, right));
        self.config
            .render
            .output_dir
            .join(format!("{stem}.{}", self.renderer.extension()))
    }

    async fn write_delta(&self, path: &Path, delta: &SchemaDelta) -> SessionResult<()> {
        let json = serde_json::to_string(&delta.to_json())
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        write_file(path, json).await?;
        info!(path = %path.display(), "delta written");
        Ok(())
    }

    async fn write_visualization(
        &self,
        target: &VisualizationTarget,
        left: &SchemaSnapshot,
        right: &SchemaSnapshot,
        delta: &SchemaDelta,
    ) -> SessionResult<PathBuf> {
        let path = match target {
            VisualizationTarget::Path(path) => path.clone(),
            VisualizationTarget::Derived => {
                let dir = &self.config.render.output_dir;
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|source| SessionError::OutputWrite {
                        path: dir.clone(),
                        source,
                    })?;
                self.derived_visualization_path(left.meta.as_ref(), right.meta.as_ref())
            }
        };

        info!("generating visualization");
        let context = RenderContext::new(
            &left.schemas,
            delta,
            left.meta.as_ref(),
            right.meta.as_ref(),
        );
        let page = self.renderer.render(&context)?;
        write_file(&path, page).await?;
        info!(path = %path.display(), "visualization written");
        Ok(path)
    }
}

fn describe(meta: Option<&ServerMetadata>) -> String {
    meta.map_or_else(|| "local file".to_string(), ToString::to_string)
}

async fn write_file(path: &Path, contents: String) -> SessionResult<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| SessionError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })
}
