//! Runtime settings for one crawl run.

use std::path::PathBuf;
use std::time::Duration;

use crate::download::DEFAULT_POOL_WIDTH;
use crate::fetch::DEFAULT_TIMEOUT_SECS;

/// Default storage directory for downloaded assets.
pub const DEFAULT_STORE_DIR: &str = "Science";

/// Default pause between index-page batches in seconds.
pub const DEFAULT_PAGE_DELAY_SECS: u64 = 5;

/// Externally settable knobs for the pipeline.
///
/// Every field has a default but none is hardcoded at the use site;
/// the CLI (or a test) owns the values.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory assets are stored in; created at startup if absent.
    pub store_dir: PathBuf,
    /// Worker-pool width for the download engine.
    pub pool_width: usize,
    /// Per-request socket timeout.
    pub request_timeout: Duration,
    /// Politeness pause between index-page batches.
    pub page_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            pool_width: DEFAULT_POOL_WIDTH,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_delay: Duration::from_secs(DEFAULT_PAGE_DELAY_SECS),
        }
    }
}
