//! Schema snapshot cache for sdiff.
//!
//! Fetched schema documents are large and change only when a server is
//! upgraded, so they are cached under a key derived from the server's
//! reported metadata: `{version}_{revision}`. Two servers reporting the same
//! version and revision share one entry regardless of where they live.
//!
//! # Storage Backends
//!
//! All backends implement the [`CacheStore`] trait:
//!
//! - [`FsCacheStore`] -- one JSON file per key under a cache directory
//! - [`InMemoryCacheStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Rules
//!
//! 1. A miss is `Ok(None)`, never an error.
//! 2. An entry is never written without metadata.
//! 3. Only the schema payload is cached; metadata is always fetched live.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsCacheStore;
pub use memory::InMemoryCacheStore;
pub use traits::CacheStore;
