//! Per-job work done by each stage: read, transform, write, acknowledge.
//!
//! The `*_file` functions do the I/O and return errors; the stage functions
//! wrap them with the logging and counting the pool workers need. A failed
//! job is dropped right where it failed and never reaches a later stage.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{PipelineError, PipelineResult};
use crate::types::Job;

use super::rewrite::Substitution;
use super::stats::PipelineStats;

/// Permission bits for files the write stage has to create.
pub const FILE_MODE: u32 = 0o644;

/// Load a file's bytes.
///
/// The content is not decoded; only a missing file, a permission problem or
/// an I/O error fails the read.
pub async fn read_file(path: &Path) -> PipelineResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Overwrite a file with `content`, truncating whatever was there.
///
/// Not atomic: a failure part-way leaves the file truncated or partially
/// written.
pub async fn write_file(path: &Path, content: &[u8]) -> PipelineResult<()> {
    let to_error = |source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = options.open(path).await.map_err(to_error)?;
    file.write_all(content).await.map_err(to_error)?;
    file.flush().await.map_err(to_error)?;
    Ok(())
}

/// Read stage: fill the job's content from disk.
pub async fn read(mut job: Job, stats: &PipelineStats) -> Option<Job> {
    tracing::debug!("reading {} [{}]", job.path().display(), job.seq());
    match read_file(job.path()).await {
        Ok(content) => {
            job.set_content(content);
            Some(job)
        }
        Err(e) => {
            tracing::warn!("{} error for [{}]: {}", e.stage(), job.seq(), e);
            stats.record_read_failure();
            None
        }
    }
}

/// Transform stage: apply the substitution to the job's content.
pub fn transform(mut job: Job, substitution: &Substitution) -> Job {
    let (content, replacements) = substitution.apply(job.take_content());
    tracing::trace!(
        "{} replacement(s) in {} [{}]",
        replacements,
        job.path().display(),
        job.seq()
    );
    job.set_content(content);
    job.set_replacements(replacements);
    job
}

/// Write stage: persist the job's content in place.
pub async fn write(job: Job, stats: &PipelineStats) -> Option<Job> {
    match write_file(job.path(), job.content()).await {
        Ok(()) => Some(job),
        Err(e) => {
            tracing::warn!("{} error for [{}]: {}", e.stage(), job.seq(), e);
            stats.record_write_failure();
            None
        }
    }
}

/// Acknowledge stage: log completion and count the job.
pub fn acknowledge(job: Job, stats: &PipelineStats) {
    tracing::info!(
        "finish processing {} [{}] ({} replacement(s))",
        job.path().display(),
        job.seq(),
        job.replacements()
    );
    stats.record_success(job.replacements(), job.content().len() as u64);
}
