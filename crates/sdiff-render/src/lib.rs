//! Visualization of schema deltas.
//!
//! A [`Renderer`] turns the left-hand document, the delta and both sides'
//! metadata into a single artifact. [`HtmlRenderer`] produces a standalone
//! page that draws the delta with jsondiffpatch's HTML formatter.

pub mod context;
pub mod error;
pub mod html;
pub mod template;

pub use context::{RenderContext, RenderMeta, Renderer};
pub use error::{RenderError, RenderResult};
pub use html::HtmlRenderer;
pub use template::Template;
