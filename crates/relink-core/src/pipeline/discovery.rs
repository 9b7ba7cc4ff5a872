//! Directory traversal: finds matching files and stamps them as jobs.

use std::io;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::config::RewriteConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Job;

use super::stats::PipelineStats;

/// Hands out job sequence numbers, starting at 1.
///
/// One sequencer belongs to one walk; nothing else ever stamps a job.
#[derive(Debug, Default)]
pub struct Sequencer {
    last: u64,
}

impl Sequencer {
    /// Stamp a new job for `path` with the next sequence number.
    pub fn next_job(&mut self, path: PathBuf) -> Job {
        self.last += 1;
        Job::new(self.last, path)
    }

    /// How many jobs have been stamped.
    pub fn issued(&self) -> u64 {
        self.last
    }
}

/// How a walk ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Jobs handed to `emit`
    pub issued: u64,
    /// The walk was cut short by cancellation
    pub cancelled: bool,
}

/// Walks a directory tree depth-first and emits a job per matching file.
#[derive(Debug, Clone)]
pub struct Traverser {
    suffix: String,
}

impl Traverser {
    /// Create a traverser matching the configured extension.
    pub fn new(config: &RewriteConfig) -> Self {
        Self {
            suffix: config.extension_suffix(),
        }
    }

    /// The file name suffix this traverser selects.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Make `root` absolute and check it can be listed.
    pub fn resolve_root(root: &Path) -> PipelineResult<PathBuf> {
        let unreadable = |source: io::Error| PipelineError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        };
        let root = std::path::absolute(root).map_err(unreadable)?;
        std::fs::read_dir(&root).map_err(unreadable)?;
        Ok(root)
    }

    /// Walk `root`, calling `emit` for each matching regular file.
    ///
    /// Symlinks are not followed; a link whose name matches is logged and
    /// counted instead. A directory that cannot be listed is logged and its
    /// subtree skipped. The walk stops early when `emit` returns `false`
    /// (downstream gone) or when `cancel` fires.
    pub fn walk<F>(
        &self,
        root: &Path,
        stats: &PipelineStats,
        cancel: &CancellationToken,
        mut emit: F,
    ) -> WalkReport
    where
        F: FnMut(Job) -> bool,
    {
        let mut sequencer = Sequencer::default();
        let mut cancelled = false;

        for entry in WalkDir::new(root).follow_links(false) {
            if cancel.is_cancelled() {
                tracing::debug!("Traversal cancelled after {} file(s)", sequencer.issued());
                cancelled = true;
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let err = PipelineError::Traverse {
                        path: e.path().unwrap_or(root).to_path_buf(),
                        source: io::Error::from(e),
                    };
                    tracing::warn!("Skipping subtree: {}", err);
                    stats.record_skipped_dir();
                    continue;
                }
            };

            if !self.matches(entry.path()) {
                continue;
            }
            if entry.path_is_symlink() {
                tracing::debug!("Skipping symlink {}", entry.path().display());
                stats.record_skipped_link();
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let job = sequencer.next_job(entry.into_path());
            tracing::info!("start processing {} [{}]", job.path().display(), job.seq());
            stats.record_discovered();

            if !emit(job) {
                tracing::debug!("Downstream closed, stopping traversal");
                break;
            }
        }

        WalkReport {
            issued: sequencer.issued(),
            cancelled,
        }
    }

    /// Case-sensitive suffix match on the file name.
    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name.as_encoded_bytes().ends_with(self.suffix.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn traverser() -> Traverser {
        Traverser::new(&RewriteConfig::default())
    }

    fn collect(root: &Path) -> (Vec<Job>, PipelineStats) {
        let stats = PipelineStats::default();
        let mut jobs = Vec::new();
        traverser().walk(root, &stats, &CancellationToken::new(), |job| {
            jobs.push(job);
            true
        });
        (jobs, stats)
    }

    #[test]
    fn test_matches() {
        let t = traverser();
        assert!(t.matches(Path::new("index.html")));
        assert!(t.matches(Path::new("/a/b/page.tar.html")));
        assert!(t.matches(Path::new(".html")));
        assert!(!t.matches(Path::new("index.HTML")));
        assert!(!t.matches(Path::new("index.htm")));
        assert!(!t.matches(Path::new("notes.txt")));
        assert!(!t.matches(Path::new("html")));
    }

    #[test]
    fn test_sequencer_counts_from_one() {
        let mut seq = Sequencer::default();
        assert_eq!(seq.next_job(PathBuf::from("a")).seq(), 1);
        assert_eq!(seq.next_job(PathBuf::from("b")).seq(), 2);
        assert_eq!(seq.issued(), 2);
    }

    #[test]
    fn test_walk_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("a.html"), "").unwrap();
        fs::write(root.join("b.txt"), "").unwrap();
        fs::write(root.join("sub/c.html"), "").unwrap();
        fs::write(root.join("sub/deeper/d.html"), "").unwrap();
        fs::create_dir(root.join("dir.html")).unwrap();

        let (jobs, stats) = collect(root);

        let mut paths: Vec<PathBuf> = jobs.iter().map(|j| j.path().to_path_buf()).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                root.join("a.html"),
                root.join("sub/c.html"),
                root.join("sub/deeper/d.html"),
            ]
        );

        let mut seqs: Vec<u64> = jobs.iter().map(Job::seq).collect();
        seqs.sort_unstable();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert!(jobs.iter().all(|j| j.content().is_empty()));
        assert_eq!(stats.discovered(), 3);
    }

    #[test]
    fn test_walk_stops_when_emit_refuses() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("{i}.html")), "").unwrap();
        }

        let stats = PipelineStats::default();
        let report = traverser().walk(dir.path(), &stats, &CancellationToken::new(), |_| false);
        assert_eq!(report.issued, 1);
        assert!(!report.cancelled);
    }

    #[test]
    fn test_walk_honors_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let stats = PipelineStats::default();
        let report = traverser().walk(dir.path(), &stats, &cancel, |_| true);
        assert_eq!(report.issued, 0);
        assert!(report.cancelled);
    }

    #[test]
    fn test_completed_walk_is_not_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "").unwrap();

        let cancel = CancellationToken::new();
        let stats = PipelineStats::default();
        let report = traverser().walk(dir.path(), &stats, &cancel, |_| true);
        // Firing after the walk is over changes nothing.
        cancel.cancel();
        assert_eq!(
            report,
            WalkReport {
                issued: 1,
                cancelled: false
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_counts_matching_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("target.html"), "").unwrap();
        fs::write(root.join("real.html"), "").unwrap();
        std::os::unix::fs::symlink(outside.path().join("target.html"), root.join("link.html"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path().join("target.html"), root.join("link.txt"))
            .unwrap();

        let (jobs, stats) = collect(root);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].path(), root.join("real.html"));
        assert_eq!(stats.snapshot(Default::default(), false).skipped_links, 1);
    }

    #[test]
    fn test_resolve_root_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = Traverser::resolve_root(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, PipelineError::RootUnreadable { .. }));
    }

    #[test]
    fn test_resolve_root_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.html");
        fs::write(&file, "").unwrap();
        assert!(Traverser::resolve_root(&file).is_err());
    }

    #[test]
    fn test_resolve_root_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let root = Traverser::resolve_root(dir.path()).unwrap();
        assert!(root.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_unreadable_subtree() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.html"), "").unwrap();
        fs::write(root.join("visible.html"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to assert in that case.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let (jobs, stats) = collect(root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].path(), root.join("visible.html"));
        assert_eq!(stats.snapshot(Default::default(), false).skipped_dirs, 1);
    }
}
