//! Semantic diff engine for schema documents.
//!
//! Arrays of schema nodes are compared by node identity rather than by
//! position, and location-derived properties are ignored, so two servers at
//! different hostnames running the same schemas produce an empty delta.
//!
//! Deltas use the jsondiffpatch encoding, so a written delta can be replayed
//! or visualized by any jsondiffpatch-compatible consumer.
//!
//! # Key Types
//!
//! - [`SchemaDiffer`] / [`DiffOptions`] -- the differ and its rules
//! - [`IdentityStrategy`] / [`PropertyFilter`] -- node identity and field exclusion
//! - [`SchemaDelta`] / [`Delta`] / [`ArrayChange`] -- the resulting change set
//! - [`patch`] -- replay a delta onto the left-hand value
//! - [`ChangeReport`] -- per-collection summary of changed nodes

pub mod delta;
pub mod differ;
pub mod error;
pub mod options;
pub mod patch;
pub mod report;

pub use delta::{ArrayChange, Delta, DeltaStats, SchemaDelta};
pub use differ::SchemaDiffer;
pub use error::{DeltaError, DeltaResult};
pub use options::{DiffOptions, IdentityStrategy, PropertyFilter};
pub use patch::{patch, patch_document};
pub use report::{ChangeReport, CollectionChange, NodeChanges};
