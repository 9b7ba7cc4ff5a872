//! Link rewriting pipeline components.
//!
//! This module contains all the stages of the rewriting pipeline:
//! - **discovery**: Walk the tree and stamp matching files as jobs
//! - **channel**: Bounded queues and fixed-size worker pools
//! - **stages**: Read, transform, write and acknowledge a single job
//! - **rewrite**: The literal substitution applied by the transform stage
//! - **stats**: Outcome counters for a run
//! - **processor**: Orchestrates the full pipeline

pub mod channel;
pub mod discovery;
pub mod processor;
pub mod rewrite;
pub mod stages;
pub mod stats;

// Re-exports for convenient access
pub use channel::{bounded_channel, StageHandle, StagePool};
pub use discovery::{Sequencer, Traverser, WalkReport};
pub use processor::Pipeline;
pub use rewrite::Substitution;
pub use stats::PipelineStats;
