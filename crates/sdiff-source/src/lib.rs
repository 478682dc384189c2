//! Schema source resolution for sdiff.
//!
//! A location is either a local snapshot file or a schema server. Servers
//! are reached through a [`SchemaTransport`]; downloaded documents are
//! cached in a [`sdiff_store::CacheStore`] keyed by server version and
//! revision.

pub mod error;
pub mod locator;
pub mod resolver;
pub mod transport;

pub use error::{SourceError, SourceResult};
pub use locator::{join_url, Locator};
pub use resolver::{
    Endpoints, ResolverOptions, SchemaResolver, DEFAULT_INFO_ENDPOINT, DEFAULT_SCHEMAS_ENDPOINT,
};
pub use transport::{Credentials, HttpOptions, HttpTransport, SchemaTransport, StaticTransport};
