//! Download job descriptions and per-job outcomes.

use std::path::PathBuf;

/// One (source URL, destination path) download task.
///
/// A job with no source URL is a no-op: the engine records it as skipped
/// without touching the network or the filesystem. Jobs are immutable once
/// built; the destination path is what makes re-runs idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// Where to download from, when the asset was found on the detail page.
    pub source_url: Option<String>,
    /// Where the asset lands on disk.
    pub dest: PathBuf,
}

impl DownloadJob {
    /// Creates a job for an asset that was found.
    #[must_use]
    pub fn new(source_url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source_url: Some(source_url.into()),
            dest: dest.into(),
        }
    }

    /// Creates a no-op job for an asset that was not found.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            source_url: None,
            dest: PathBuf::new(),
        }
    }

    /// True when this job has nothing to download.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.source_url.is_none()
    }
}

/// Terminal outcome of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The asset was transferred to its destination.
    Completed,
    /// Nothing to do: no source URL, or the destination file is already
    /// at (or past) the remote size.
    Skipped,
}
