//! Core data types for the relink pipeline.
//!
//! A [`Job`] is the unit of work handed from stage to stage. A [`RunSummary`]
//! is what a finished run reports back to the caller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One discovered file travelling through the pipeline.
///
/// Jobs are only created by the traverser's sequencer, so `seq` is assigned
/// exactly once and `path` never changes. Ownership moves through the stage
/// queues by value; no stage ever shares a job.
#[derive(Debug)]
pub struct Job {
    seq: u64,
    path: PathBuf,
    content: Vec<u8>,
    replacements: usize,
}

impl Job {
    pub(crate) fn new(seq: u64, path: PathBuf) -> Self {
        Self {
            seq,
            path,
            content: Vec::new(),
            replacements: 0,
        }
    }

    /// Discovery sequence number, for correlating log lines.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Path of the file this job rewrites.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file bytes (empty until the read stage fills them).
    ///
    /// Content is never decoded, so files in legacy encodings pass through
    /// with only the matched bytes changed.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Number of substitutions the transform stage made.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub(crate) fn set_content(&mut self, content: Vec<u8>) {
        self.content = content;
    }

    pub(crate) fn take_content(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.content)
    }

    pub(crate) fn set_replacements(&mut self, replacements: usize) {
        self.replacements = replacements;
    }
}

/// Aggregate outcome of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RunSummary {
    /// Matching files found by the traverser
    pub discovered: u64,

    /// Files read, rewritten, written and acknowledged
    pub succeeded: u64,

    /// Files dropped because they could not be read
    pub read_failed: u64,

    /// Files dropped because the rewritten content could not be written
    pub write_failed: u64,

    /// Directories whose subtree was skipped because they could not be listed
    pub skipped_dirs: u64,

    /// Total substitutions across all acknowledged files
    pub replacements: u64,

    /// Total bytes written by acknowledged files
    pub bytes_written: u64,

    /// Symlinks whose name matched the extension; links are never followed
    pub skipped_links: u64,

    /// True when the run was stopped before the pipeline drained
    pub cancelled: bool,

    /// Wall-clock run time in seconds
    pub total_seconds: f64,
}

impl RunSummary {
    /// Files that entered the pipeline but did not complete.
    pub fn failed(&self) -> u64 {
        self.read_failed + self.write_failed
    }

    /// Completed files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.total_seconds > 0.0 {
            self.succeeded as f64 / self.total_seconds
        } else {
            0.0
        }
    }
}
