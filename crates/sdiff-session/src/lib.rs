//! Diff session orchestration for sdiff.
//!
//! A [`DiffSession`] takes a [`DiffSessionRequest`] naming two schema
//! sources, resolves both concurrently, computes the semantic delta and
//! writes the requested artifacts: the raw jsondiffpatch delta and an HTML
//! visualization. All behavior is driven by an explicit [`DiffConfig`].
//!
//! ```no_run
//! # async fn example() -> sdiff_session::SessionResult<()> {
//! use sdiff_session::{DiffConfig, DiffSession, DiffSessionRequest, VisualizationTarget};
//!
//! let session = DiffSession::from_config(DiffConfig::default(), None)?;
//! let request = DiffSessionRequest::new("/2.29", "/dev")
//!     .with_base_url("https://play.dhis2.org")
//!     .with_output("delta.json")
//!     .with_visualization(VisualizationTarget::Derived);
//! let outcome = session.run(&request).await?;
//! println!("{} collections changed", outcome.delta.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod request;
pub mod session;

pub use config::{CacheConfig, DiffConfig, IdentityConfig, RemoteConfig, RenderConfig};
pub use error::{SessionError, SessionResult};
pub use request::{DiffSessionRequest, VisualizationTarget};
pub use session::{DiffSession, SessionOutcome};
