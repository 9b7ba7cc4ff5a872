//! Error types for the relink rewriting pipeline.
//!
//! Per-file failures are recovered inside the pipeline and only logged and
//! counted. The only pipeline error that escapes a run is an unreadable root.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for relink operations.
#[derive(Error, Debug)]
pub enum RelinkError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, one variant per stage that can fail.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The root directory itself cannot be listed
    #[error("Cannot read root directory {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory below the root could not be listed; its subtree is skipped
    #[error("Cannot read directory {path}: {source}")]
    Traverse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovered file could not be read
    #[error("Read failed for {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transformed content could not be persisted
    #[error("Write failed for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Short stage label used in log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::RootUnreadable { .. } | PipelineError::Traverse { .. } => "traverse",
            PipelineError::Read { .. } => "read",
            PipelineError::Write { .. } => "write",
        }
    }
}

/// Convenience type alias for relink results.
pub type Result<T> = std::result::Result<T, RelinkError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
