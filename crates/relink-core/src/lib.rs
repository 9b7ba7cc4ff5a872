//! relink Core - concurrent in-place link rewriting.
//!
//! relink walks a directory tree, picks the files with a given extension and
//! rewrites one literal substring to another (by default `http://` to
//! `https://`), writing each file back in place.
//!
//! # Architecture
//!
//! Work flows one way through bounded queues, each stage served by a fixed
//! pool of workers:
//!
//! ```text
//! Traverse → Read → Transform → Write → Acknowledge
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use relink_core::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> relink_core::Result<()> {
//!     let config = Config::load()?;
//!     let summary = Pipeline::new(&config)?.run("./site".as_ref()).await?;
//!     println!("Rewrote {} file(s)", summary.succeeded);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, RelinkError, Result};
pub use pipeline::{Pipeline, Substitution, Traverser};
pub use types::{Job, RunSummary};

/// Re-exported so callers can cancel a run without depending on tokio-util.
pub use tokio_util::sync::CancellationToken;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
