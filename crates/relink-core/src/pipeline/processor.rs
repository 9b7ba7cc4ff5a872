//! Pipeline orchestration - wires the traverser and the four stage pools.
//!
//! ```text
//! traverse ─▶ [discovered] ─▶ read ─▶ [read] ─▶ transform ─▶ [transformed] ─▶ write ─▶ [written] ─▶ acknowledge
//! ```
//!
//! Every queue is bounded. A queue closes when the last producer feeding it
//! finishes, so the run ends once the walk is done and every stage has
//! drained, with no timing assumptions.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::config::{Config, PipelineConfig};
use crate::error::Result;
use crate::types::{Job, RunSummary};

use super::channel::{bounded_channel, StagePool};
use super::discovery::Traverser;
use super::rewrite::Substitution;
use super::stages;
use super::stats::PipelineStats;

/// The rewriting pipeline for one configuration.
///
/// A `Pipeline` holds no per-run state; `run` can be called repeatedly.
pub struct Pipeline {
    traverser: Traverser,
    substitution: Arc<Substitution>,
    sizing: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from the given configuration.
    ///
    /// The configuration is validated first, so a pipeline never runs with
    /// zero workers or zero-capacity queues.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            traverser: Traverser::new(&config.rewrite),
            substitution: Arc::new(Substitution::from_config(&config.rewrite)),
            sizing: config.pipeline.clone(),
        })
    }

    /// Rewrite every matching file under `root` and wait for completion.
    pub async fn run(&self, root: &Path) -> Result<RunSummary> {
        self.run_until(root, CancellationToken::new()).await
    }

    /// Like [`Pipeline::run`], but stops early once `cancel` fires.
    ///
    /// Cancellation stops the walk and every worker at its next await point.
    /// Jobs still queued are dropped; files already written stay written.
    ///
    /// Fails only when `root` itself cannot be listed. Per-file failures are
    /// logged and counted in the returned summary.
    pub async fn run_until(&self, root: &Path, cancel: CancellationToken) -> Result<RunSummary> {
        let start = Instant::now();
        let root = Traverser::resolve_root(root)?;
        let workers = self.sizing.workers;

        tracing::info!(
            "Rewriting {:?} -> {:?} in *{} under {} ({} workers/stage, buffer {})",
            self.substitution.pattern(),
            self.substitution.replacement(),
            self.traverser.suffix(),
            root.display(),
            workers,
            self.sizing.buffer_size
        );

        let stats = Arc::new(PipelineStats::default());

        let (discovered_tx, discovered_rx) = bounded_channel::<Job>(&self.sizing);
        let (read_tx, read_rx) = bounded_channel::<Job>(&self.sizing);
        let (transformed_tx, transformed_rx) = bounded_channel::<Job>(&self.sizing);
        let (written_tx, written_rx) = bounded_channel::<Job>(&self.sizing);

        // Start consumers before the producer so the walk never waits on an
        // unattended queue.
        let readers = StagePool::new("read", workers, discovered_rx, read_tx).spawn(
            {
                let stats = Arc::clone(&stats);
                move |job| {
                    let stats = Arc::clone(&stats);
                    async move { stages::read(job, &stats).await }
                }
            },
            cancel.clone(),
        );

        let transformers = StagePool::new("transform", workers, read_rx, transformed_tx).spawn(
            {
                let substitution = Arc::clone(&self.substitution);
                move |job| {
                    let substitution = Arc::clone(&substitution);
                    async move { Some(stages::transform(job, &substitution)) }
                }
            },
            cancel.clone(),
        );

        let writers = StagePool::new("write", workers, transformed_rx, written_tx).spawn(
            {
                let stats = Arc::clone(&stats);
                move |job| {
                    let stats = Arc::clone(&stats);
                    async move { stages::write(job, &stats).await }
                }
            },
            cancel.clone(),
        );

        let acknowledgers = StagePool::sink("acknowledge", workers, written_rx).spawn(
            {
                let stats = Arc::clone(&stats);
                move |job| {
                    let stats = Arc::clone(&stats);
                    async move {
                        stages::acknowledge(job, &stats);
                        None::<()>
                    }
                }
            },
            cancel.clone(),
        );

        // walkdir is synchronous; blocking_send gives the walk backpressure.
        let walk = {
            let traverser = self.traverser.clone();
            let stats = Arc::clone(&stats);
            let cancel = cancel.clone();
            let root = root.clone();
            tokio::task::spawn_blocking(move || {
                traverser.walk(&root, &stats, &cancel, |job| {
                    discovered_tx.blocking_send(job).is_ok()
                })
            })
        };

        let mut cancelled = match walk.await {
            Ok(report) => {
                tracing::debug!("Traversal finished, {} file(s) queued", report.issued);
                report.cancelled
            }
            Err(e) => {
                tracing::error!("Traversal task failed: {}", e);
                false
            }
        };

        // A cancel that lands after a stage has drained cut nothing short.
        for stage in [readers, transformers, writers, acknowledgers] {
            cancelled |= stage.join().await;
        }

        let summary = stats.snapshot(start.elapsed(), cancelled);
        if summary.cancelled {
            tracing::warn!(
                "Run cancelled: {} of {} file(s) completed",
                summary.succeeded,
                summary.discovered
            );
        } else {
            tracing::info!(
                "Finished: {} succeeded, {} failed, {} director(ies) skipped in {:.2}s",
                summary.succeeded,
                summary.failed(),
                summary.skipped_dirs,
                summary.total_seconds
            );
        }

        Ok(summary)
    }
}
