//! Idempotent, streamed, concurrency-bounded asset downloads.
//!
//! The engine consumes [`DownloadJob`]s produced by the resolver and streams
//! each asset to disk through a bounded worker pool. Already-complete files
//! are skipped, partial files are re-fetched, and every failure is isolated
//! to its own job.

mod engine;
mod error;
mod job;

pub use engine::{BatchStats, DEFAULT_POOL_WIDTH, DownloadEngine, EngineError};
pub use error::DownloadError;
pub use job::{DownloadJob, JobOutcome};
