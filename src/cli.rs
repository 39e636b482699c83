//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use podscrape_core::config::{DEFAULT_PAGE_DELAY_SECS, DEFAULT_STORE_DIR, Settings};
use podscrape_core::download::DEFAULT_POOL_WIDTH;
use podscrape_core::fetch::DEFAULT_TIMEOUT_SECS;

/// Crawl a paginated podcast index and mirror episode audio and transcripts.
///
/// Podscrape walks the site's index pages, resolves each episode's detail
/// page to its audio/transcript links, and downloads the assets with
/// idempotent resume: files already on disk at full size are never fetched
/// again.
#[derive(Parser, Debug)]
#[command(name = "podscrape")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory to store downloaded assets in (created if absent)
    #[arg(short = 'd', long, default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,

    /// Maximum concurrent downloads per page batch (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_POOL_WIDTH as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Per-request socket timeout in seconds (1-300)
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Pause between index pages in seconds (0 to disable, max 3600)
    #[arg(short = 'p', long, default_value_t = DEFAULT_PAGE_DELAY_SECS, value_parser = clap::value_parser!(u64).range(0..=3600))]
    pub page_delay: u64,

    /// Path to a JSON site config overriding the built-in site defaults
    #[arg(long)]
    pub site_config: Option<PathBuf>,
}

impl Args {
    /// Converts parsed arguments into pipeline settings.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            store_dir: self.store_dir.clone(),
            pool_width: usize::from(self.concurrency),
            request_timeout: Duration::from_secs(self.timeout),
            page_delay: Duration::from_secs(self.page_delay),
        }
    }
}
