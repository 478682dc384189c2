use std::collections::HashMap;
use std::path::Path;

use sdiff_types::ServerMetadata;
use serde::Serialize;
use tracing::debug;

use crate::context::{RenderContext, Renderer};
use crate::error::{RenderError, RenderResult};
use crate::template::{escape_html, script_safe_json, Template};

const BUILTIN_TEMPLATE: &str = include_str!("../templates/report.html");
const VIEWER_JS: &str = include_str!("../templates/viewer.js");
const VIEWER_CSS: &str = include_str!("../templates/viewer.css");

/// Placeholders an HTML template may use.
///
/// `*_version` values are HTML-escaped text; `*_json` values are JSON
/// literals safe to embed in a script element. `viewer_*` values are the
/// bundled delta viewer assets, inserted verbatim.
pub const PLACEHOLDERS: &[&str] = &[
    "viewer_js",
    "viewer_css",
    "left_version",
    "right_version",
    "left_json",
    "delta_json",
    "meta_json",
];

/// Renders a standalone HTML page that needs no network access to view.
#[derive(Clone, Debug)]
pub struct HtmlRenderer {
    template: Template,
}

impl HtmlRenderer {
    /// Renderer using the built-in page.
    pub fn new() -> RenderResult<Self> {
        Self::from_template(BUILTIN_TEMPLATE)
    }

    pub fn from_template(source: &str) -> RenderResult<Self> {
        Ok(Self {
            template: Template::parse(source, PLACEHOLDERS)?,
        })
    }

    pub fn from_file(path: &Path) -> RenderResult<Self> {
        debug!(path = %path.display(), "loading report template");
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_template(&source)
    }
}

fn version_label(meta: Option<&ServerMetadata>) -> String {
    escape_html(&meta.map_or_else(|| sdiff_types::metadata::UNKNOWN.to_string(), |m| m.to_string()))
}

fn embed<T: Serialize + ?Sized>(value: &T) -> RenderResult<String> {
    let json = serde_json::to_string(value).map_err(|e| RenderError::Serialization(e.to_string()))?;
    Ok(script_safe_json(&json))
}

impl Renderer for HtmlRenderer {
    fn render(&self, context: &RenderContext<'_>) -> RenderResult<String> {
        let values: HashMap<&str, String> = HashMap::from([
            ("viewer_js", VIEWER_JS.to_string()),
            ("viewer_css", VIEWER_CSS.to_string()),
            ("left_version", version_label(context.meta.left)),
            ("right_version", version_label(context.meta.right)),
            ("left_json", embed(context.left)?),
            ("delta_json", embed(&context.delta.to_json())?),
            ("meta_json", embed(&context.meta)?),
        ]);
        self.template.fill(|name| values.get(name).map(String::as_str))
    }

    fn extension(&self) -> &str {
        "html"
    }
}
