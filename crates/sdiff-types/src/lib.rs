//! Foundation types for sdiff.
//!
//! Every other sdiff crate depends on `sdiff-types`. The types here carry no
//! behaviour beyond construction, validation, and the deterministic naming
//! rules shared by the cache and the visualization output.
//!
//! # Key Types
//!
//! - [`ServerMetadata`] -- version/revision reported by a schema server
//! - [`SchemaDocument`] -- collection key to schema node arrays
//! - [`SchemaSnapshot`] -- a document paired with the metadata it came from

pub mod document;
pub mod error;
pub mod metadata;
pub mod snapshot;

pub use document::SchemaDocument;
pub use error::{TypeError, TypeResult};
pub use metadata::ServerMetadata;
pub use snapshot::{SchemaSnapshot, META_FIELD};
