use sdiff_diff::SchemaDelta;
use sdiff_types::{SchemaDocument, ServerMetadata};
use serde::Serialize;

/// Metadata of both compared snapshots.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RenderMeta<'a> {
    pub left: Option<&'a ServerMetadata>,
    pub right: Option<&'a ServerMetadata>,
}

/// Everything a renderer sees: the left document, the delta computed
/// against it, and both sides' metadata.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub left: &'a SchemaDocument,
    pub delta: &'a SchemaDelta,
    pub meta: RenderMeta<'a>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        left: &'a SchemaDocument,
        delta: &'a SchemaDelta,
        left_meta: Option<&'a ServerMetadata>,
        right_meta: Option<&'a ServerMetadata>,
    ) -> Self {
        Self {
            left,
            delta,
            meta: RenderMeta {
                left: left_meta,
                right: right_meta,
            },
        }
    }
}

/// Produces a visualization artifact from a [`RenderContext`].
pub trait Renderer: Send + Sync {
    fn render(&self, context: &RenderContext<'_>) -> crate::RenderResult<String>;

    /// File extension of the artifact, without the dot.
    fn extension(&self) -> &str;
}
