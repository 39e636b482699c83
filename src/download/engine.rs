//! Download engine for concurrent, idempotent file downloads.
//!
//! This module provides the `DownloadEngine` which executes a batch of
//! [`DownloadJob`]s on a semaphore-bounded worker pool, streaming each
//! response body to disk and skipping files that are already complete.
//!
//! # Concurrency model
//!
//! - Each job runs in its own Tokio task
//! - A semaphore permit is acquired before spawning each job
//! - Permits are released automatically when jobs finish (RAII)
//! - `run_batch` joins every spawned task before returning, so a batch is a
//!   barrier: the caller only advances once all jobs reached a terminal
//!   outcome
//!
//! # Idempotence
//!
//! A job whose destination file already exists at (or past) the remote
//! `content-length` is counted as skipped without re-downloading or
//! truncating it. Re-running a batch therefore only transfers missing or
//! incomplete files.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::error::DownloadError;
use super::job::{DownloadJob, JobOutcome};
use crate::fetch::{FetchError, HttpClient};

/// Minimum allowed worker-pool width.
const MIN_POOL_WIDTH: usize = 1;

/// Maximum allowed worker-pool width.
const MAX_POOL_WIDTH: usize = 100;

/// Default worker-pool width if not specified.
pub const DEFAULT_POOL_WIDTH: usize = 5;

/// Write-buffer size for streamed downloads (10 KiB).
const WRITE_BUFFER_BYTES: usize = 10 * 1024;

/// Error type for download engine operations.
///
/// Individual job failures are NOT engine errors; they are counted in
/// [`BatchStats`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid pool width provided.
    #[error("invalid pool width {value}: must be between {MIN_POOL_WIDTH} and {MAX_POOL_WIDTH}")]
    InvalidPoolWidth {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Aggregate outcome counts for a batch run.
///
/// Uses atomic counters so concurrent job tasks can update them without a
/// lock.
#[derive(Debug, Default)]
pub struct BatchStats {
    completed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl BatchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs that transferred their asset.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of jobs skipped: no source URL, or destination already complete.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Number of jobs that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Total jobs that reached a terminal outcome.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.skipped() + self.failed()
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Executes download jobs on a bounded worker pool.
#[derive(Debug, Clone)]
pub struct DownloadEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured pool width.
    pool_width: usize,
    /// Shared HTTP client.
    client: HttpClient,
}

impl DownloadEngine {
    /// Creates an engine with the given worker-pool width.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPoolWidth`] if the value is outside the
    /// valid range (1-100).
    #[instrument(level = "debug", skip(client))]
    pub fn new(client: HttpClient, pool_width: usize) -> Result<Self, EngineError> {
        if !(MIN_POOL_WIDTH..=MAX_POOL_WIDTH).contains(&pool_width) {
            return Err(EngineError::InvalidPoolWidth { value: pool_width });
        }

        debug!(pool_width, "creating download engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(pool_width)),
            pool_width,
            client,
        })
    }

    /// Returns the configured pool width.
    #[must_use]
    pub fn pool_width(&self) -> usize {
        self.pool_width
    }

    /// Runs a batch of jobs to completion and returns aggregate counts.
    ///
    /// At most `pool_width` jobs are in flight at once; jobs complete in any
    /// order. This method only returns once every job has reached a terminal
    /// outcome (completed, skipped, or failed).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if permit acquisition fails.
    /// Individual job failures do NOT cause this method to error; they are
    /// counted in the returned stats.
    #[instrument(skip(self, jobs), fields(jobs = jobs.len()))]
    pub async fn run_batch(&self, jobs: Vec<DownloadJob>) -> Result<BatchStats, EngineError> {
        let stats = Arc::new(BatchStats::new());
        let mut handles = Vec::new();

        for job in jobs {
            if job.is_noop() {
                debug!("job has no source URL, skipping");
                stats.increment_skipped();
                continue;
            }

            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let client = self.client.clone();
            let stats = Arc::clone(&stats);

            handles.push(tokio::spawn(async move {
                // Permit is dropped when this block exits (RAII)
                let _permit = permit;
                match execute_job(&client, &job).await {
                    Ok(JobOutcome::Completed) => {
                        info!(dest = %job.dest.display(), "download complete");
                        stats.increment_completed();
                    }
                    Ok(JobOutcome::Skipped) => {
                        debug!(dest = %job.dest.display(), "destination already complete");
                        stats.increment_skipped();
                    }
                    Err(e) => {
                        warn!(dest = %job.dest.display(), error = %e, "download failed");
                        stats.increment_failed();
                    }
                }
            }));
        }

        // Batch barrier: every dispatched job reaches a terminal outcome
        // before the caller gets its counts back.
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "download task panicked");
                stats.increment_failed();
            }
        }

        let completed = stats.completed();
        let skipped = stats.skipped();
        let failed = stats.failed();
        debug!(completed, skipped, failed, "batch complete");

        // All tasks are done, so we should have sole ownership of the Arc.
        // If not (which would be a bug), rebuild stats from the atomic values.
        match Arc::try_unwrap(stats) {
            Ok(stats) => Ok(stats),
            Err(arc_stats) => {
                let new_stats = BatchStats::new();
                new_stats
                    .completed
                    .store(arc_stats.completed(), Ordering::SeqCst);
                new_stats
                    .skipped
                    .store(arc_stats.skipped(), Ordering::SeqCst);
                new_stats.failed.store(arc_stats.failed(), Ordering::SeqCst);
                Ok(new_stats)
            }
        }
    }
}

/// Executes one job: fetch, completeness check, streamed write.
///
/// # Errors
///
/// Returns a [`DownloadError`] for transport failures, non-success statuses,
/// a missing `content-length`, or filesystem errors. The caller treats every
/// error as a per-job failure.
async fn execute_job(client: &HttpClient, job: &DownloadJob) -> Result<JobOutcome, DownloadError> {
    let Some(url) = job.source_url.as_deref() else {
        return Ok(JobOutcome::Skipped);
    };

    let response = client.get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::http_status(url, status.as_u16()));
    }

    let remote_size = response
        .content_length()
        .ok_or_else(|| DownloadError::missing_content_length(url))?;

    // Existing file at full size: already satisfied, drop the body unread.
    if let Ok(metadata) = tokio::fs::metadata(&job.dest).await {
        if metadata.len() >= remote_size {
            return Ok(JobOutcome::Skipped);
        }
        debug!(
            dest = %job.dest.display(),
            local = metadata.len(),
            remote = remote_size,
            "partial file on disk, re-fetching"
        );
    }

    let result = stream_to_file(response, url, job).await;
    if result.is_err() {
        // Don't leave a truncated file behind for a failed transfer.
        let _ = tokio::fs::remove_file(&job.dest).await;
    }
    result?;
    Ok(JobOutcome::Completed)
}

/// Streams the response body to the job's destination in bounded chunks.
async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    job: &DownloadJob,
) -> Result<u64, DownloadError> {
    let file = File::create(&job.dest)
        .await
        .map_err(|e| DownloadError::io(&job.dest, e))?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_BYTES, file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(&job.dest, e))?;
        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(&job.dest, e))?;
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_new_valid_pool_width() {
        let engine = DownloadEngine::new(HttpClient::new(), 1).unwrap();
        assert_eq!(engine.pool_width(), 1);

        let engine = DownloadEngine::new(HttpClient::new(), DEFAULT_POOL_WIDTH).unwrap();
        assert_eq!(engine.pool_width(), 5);

        let engine = DownloadEngine::new(HttpClient::new(), 100).unwrap();
        assert_eq!(engine.pool_width(), 100);
    }

    #[test]
    fn test_engine_new_invalid_pool_width_zero() {
        let result = DownloadEngine::new(HttpClient::new(), 0);
        assert!(matches!(
            result,
            Err(EngineError::InvalidPoolWidth { value: 0 })
        ));
    }

    #[test]
    fn test_engine_new_invalid_pool_width_too_high() {
        let result = DownloadEngine::new(HttpClient::new(), 101);
        assert!(matches!(
            result,
            Err(EngineError::InvalidPoolWidth { value: 101 })
        ));
    }

    #[test]
    fn test_batch_stats_default() {
        let stats = BatchStats::default();
        assert_eq!(stats.completed(), 0);
        assert_eq!(stats.skipped(), 0);
        assert_eq!(stats.failed(), 0);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_batch_stats_increment() {
        let stats = BatchStats::new();

        stats.increment_completed();
        stats.increment_completed();
        stats.increment_skipped();
        stats.increment_failed();

        assert_eq!(stats.completed(), 2);
        assert_eq!(stats.skipped(), 1);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_batch_stats_thread_safe() {
        use std::thread;

        let stats = Arc::new(BatchStats::new());
        let mut handles = Vec::new();

        for _ in 0..10 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.increment_completed();
                    stats.increment_skipped();
                    stats.increment_failed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.completed(), 1000);
        assert_eq!(stats.skipped(), 1000);
        assert_eq!(stats.failed(), 1000);
        assert_eq!(stats.total(), 3000);
    }

    #[test]
    fn test_engine_error_display() {
        let error = EngineError::InvalidPoolWidth { value: 0 };
        let msg = error.to_string();
        assert!(msg.contains("invalid pool width"));
        assert!(msg.contains('0'));
    }

    #[tokio::test]
    async fn test_run_batch_empty_returns_zero_stats() {
        let engine = DownloadEngine::new(HttpClient::new(), 5).unwrap();
        let stats = engine.run_batch(Vec::new()).await.unwrap();
        assert_eq!(stats.total(), 0);
    }

    #[tokio::test]
    async fn test_run_batch_noop_jobs_all_skipped() {
        let engine = DownloadEngine::new(HttpClient::new(), 5).unwrap();
        let jobs = vec![DownloadJob::noop(), DownloadJob::noop()];
        let stats = engine.run_batch(jobs).await.unwrap();
        assert_eq!(stats.skipped(), 2);
        assert_eq!(stats.completed(), 0);
        assert_eq!(stats.failed(), 0);
    }
}
