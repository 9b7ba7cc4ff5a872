//! Per-run outcome counters shared by the traverser and stage workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::types::RunSummary;

/// Live counters for one pipeline run.
///
/// Workers only ever increment; nothing reads these to make decisions, so
/// relaxed ordering is enough. The final numbers are taken after every stage
/// has been joined.
#[derive(Debug, Default)]
pub struct PipelineStats {
    discovered: AtomicU64,
    succeeded: AtomicU64,
    read_failed: AtomicU64,
    write_failed: AtomicU64,
    skipped_dirs: AtomicU64,
    skipped_links: AtomicU64,
    replacements: AtomicU64,
    bytes_written: AtomicU64,
}

impl PipelineStats {
    pub fn record_discovered(&self) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_dir(&self) {
        self.skipped_dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_link(&self) {
        self.skipped_links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self) {
        self.read_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an acknowledged file.
    pub fn record_success(&self, replacements: usize, bytes: u64) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.replacements
            .fetch_add(replacements as u64, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Matching files discovered so far.
    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Relaxed)
    }

    /// Freeze the counters into a summary.
    pub fn snapshot(&self, elapsed: Duration, cancelled: bool) -> RunSummary {
        RunSummary {
            discovered: self.discovered(),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            read_failed: self.read_failed.load(Ordering::Relaxed),
            write_failed: self.write_failed.load(Ordering::Relaxed),
            skipped_dirs: self.skipped_dirs.load(Ordering::Relaxed),
            skipped_links: self.skipped_links.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            cancelled,
            total_seconds: elapsed.as_secs_f64(),
        }
    }
}
