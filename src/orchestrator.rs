//! Pipeline driver: index pages in sequence, download batches in parallel.
//!
//! The orchestrator walks index pages strictly one at a time. Within a page
//! it resolves every detail link to jobs, hands the whole batch to the
//! download engine, waits for the batch barrier, and then pauses for the
//! configured inter-page delay before advancing. Sequential pages plus the
//! delay are the politeness contract; only the downloads inside a batch run
//! in parallel.

use regex::Regex;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::config::Settings;
use crate::crawl::IndexCrawler;
use crate::download::{DownloadEngine, DownloadJob, EngineError};
use crate::fetch::HttpClient;
use crate::page;
use crate::resolve::AssetResolver;
use crate::site::SiteConfig;

/// Structural failures that abort a whole run.
///
/// Per-page and per-asset failures never surface here; they degrade to empty
/// results or failed-job counts.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The storage directory could not be created at startup.
    #[error("cannot create storage directory {path}: {source}")]
    StoreDir {
        /// The directory that failed to create.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The download engine was misconfigured or broke down.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Cumulative counts for a full run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Index pages processed.
    pub pages: usize,
    /// Jobs that transferred an asset.
    pub completed: usize,
    /// Jobs skipped (no asset link, or file already complete).
    pub skipped: usize,
    /// Jobs that failed.
    pub failed: usize,
}

/// Drives crawl → resolve → download, page by page.
#[derive(Debug)]
pub struct Orchestrator {
    client: HttpClient,
    site: SiteConfig,
    settings: Settings,
    crawler: IndexCrawler,
    resolver: AssetResolver,
    engine: DownloadEngine,
}

impl Orchestrator {
    /// Wires up the pipeline components for one site and settings set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Engine`] if the configured pool width is
    /// invalid.
    pub fn new(site: SiteConfig, settings: Settings) -> Result<Self, PipelineError> {
        let client = HttpClient::with_timeout(settings.request_timeout);
        let engine = DownloadEngine::new(client.clone(), settings.pool_width)?;
        let crawler = IndexCrawler::new(client.clone(), site.clone());
        let resolver = AssetResolver::new(client.clone(), site.clone(), &settings.store_dir);
        Ok(Self {
            client,
            site,
            settings,
            crawler,
            resolver,
            engine,
        })
    }

    /// Runs the pipeline to completion.
    ///
    /// An unknown page count produces an empty run, not an error. The only
    /// hard failures are structural: the storage directory cannot be created
    /// or the engine is misconfigured.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] for structural failures only.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        tokio::fs::create_dir_all(&self.settings.store_dir)
            .await
            .map_err(|source| PipelineError::StoreDir {
                path: self.settings.store_dir.display().to_string(),
                source,
            })?;

        let max_page = self.crawler.determine_max_page().await;
        let page_urls = self.crawler.page_urls(max_page);
        if page_urls.is_empty() {
            info!("page count unknown, nothing to crawl");
            return Ok(RunSummary::default());
        }
        info!(pages = page_urls.len(), "starting crawl");

        let detail_pattern = self.site.detail_link_regex();
        let mut summary = RunSummary::default();

        for (index, page_url) in page_urls.iter().enumerate() {
            let detail_urls = self.detail_urls_on(page_url, detail_pattern.as_ref()).await;

            let mut jobs: Vec<DownloadJob> = Vec::with_capacity(detail_urls.len() * 2);
            for detail_url in &detail_urls {
                jobs.extend(self.resolver.resolve(detail_url).await.into_jobs());
            }

            let stats = self.engine.run_batch(jobs).await?;
            info!(
                page = index,
                episodes = detail_urls.len(),
                completed = stats.completed(),
                skipped = stats.skipped(),
                failed = stats.failed(),
                "page batch complete"
            );

            summary.pages += 1;
            summary.completed += stats.completed();
            summary.skipped += stats.skipped();
            summary.failed += stats.failed();

            // Politeness pause before touching the next index page.
            if index + 1 < page_urls.len() {
                sleep(self.settings.page_delay).await;
            }
        }

        Ok(summary)
    }

    /// Fetches one index page and extracts its detail-page URLs.
    ///
    /// Fetch failures and missing links both yield an empty set; detail URLs
    /// are deduplicated within the page and absolutized against the site
    /// root.
    async fn detail_urls_on(&self, page_url: &str, pattern: Option<&Regex>) -> Vec<String> {
        let Some(pattern) = pattern else {
            return Vec::new();
        };
        let body = match self.client.fetch_text(page_url).await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = %page_url, error = %e, "cannot fetch index page");
                return Vec::new();
            }
        };
        page::all_links_matching(&body, pattern)
            .into_iter()
            .map(|href| self.site.absolutize(&href))
            .collect()
    }
}
