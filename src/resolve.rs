//! Detail-page resolution: one episode URL in, one pair of download jobs out.
//!
//! The resolver fetches a detail page, picks out the audio and document asset
//! links, and derives the destination filename from the page's publish date.
//! Any failure along the way (fetch, missing date, missing links) degrades to
//! no-op jobs so a single broken episode never aborts its batch.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::download::DownloadJob;
use crate::fetch::HttpClient;
use crate::page;
use crate::site::SiteConfig;

/// The audio and document jobs for one detail page.
///
/// Either side may be a no-op when the corresponding asset link or the page
/// metadata was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPair {
    /// Job for the episode's audio asset.
    pub audio: DownloadJob,
    /// Job for the episode's document asset.
    pub document: DownloadJob,
}

impl JobPair {
    /// A pair of no-op jobs, used when resolution soft-fails.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            audio: DownloadJob::noop(),
            document: DownloadJob::noop(),
        }
    }

    /// Flattens the pair into plain jobs for the engine.
    #[must_use]
    pub fn into_jobs(self) -> [DownloadJob; 2] {
        [self.audio, self.document]
    }
}

/// Resolves detail pages into download jobs.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    client: HttpClient,
    site: SiteConfig,
    store_dir: PathBuf,
}

impl AssetResolver {
    /// Creates a resolver writing into `store_dir`.
    #[must_use]
    pub fn new(client: HttpClient, site: SiteConfig, store_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            site,
            store_dir: store_dir.into(),
        }
    }

    /// Resolves one detail-page URL into its audio/document job pair.
    ///
    /// Soft-fails to a pair of no-op jobs when the page cannot be fetched or
    /// carries no publish date; asset links that are individually absent
    /// yield a no-op on that side only.
    #[instrument(skip(self), fields(url = %detail_url))]
    pub async fn resolve(&self, detail_url: &str) -> JobPair {
        let body = match self.client.fetch_text(detail_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "cannot fetch detail page");
                return JobPair::noop();
            }
        };

        let Some(date_text) = page::element_text(&body, &self.site.date_selector) else {
            warn!("detail page has no publish date, skipping");
            return JobPair::noop();
        };
        let Some(stem) = derive_stem(&self.site.file_prefix, &date_text) else {
            warn!(date = %date_text, "publish date yields no filename stem, skipping");
            return JobPair::noop();
        };

        let audio_url = self
            .site
            .audio_regex()
            .and_then(|p| page::first_link_matching(&body, &p));
        let document_url = self
            .site
            .document_regex()
            .and_then(|p| page::first_link_matching(&body, &p));
        debug!(
            audio = audio_url.is_some(),
            document = document_url.is_some(),
            stem = %stem,
            "resolved detail page"
        );

        JobPair {
            audio: self.job_for(audio_url, &stem, "mp3"),
            document: self.job_for(document_url, &stem, "pdf"),
        }
    }

    fn job_for(&self, source_url: Option<String>, stem: &str, ext: &str) -> DownloadJob {
        match source_url {
            Some(url) => DownloadJob::new(url, self.dest_path(stem, ext)),
            None => DownloadJob::noop(),
        }
    }

    /// Destination path for one asset: `<storedir>/<stem>.<ext>`.
    fn dest_path(&self, stem: &str, ext: &str) -> PathBuf {
        self.store_dir.join(format!("{stem}.{ext}"))
    }

    /// The directory this resolver writes into.
    #[must_use]
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }
}

/// Derives the filename stem from a publish-date text.
///
/// Commas and periods are stripped, the first three whitespace-separated
/// tokens are joined with hyphens, and the site prefix is prepended:
/// `"Apr. 30, 2019"` with prefix `"Science-"` becomes `Science-Apr-30-2019`.
///
/// Returns `None` when the text holds no tokens at all.
#[must_use]
pub fn derive_stem(prefix: &str, date_text: &str) -> Option<String> {
    let cleaned = date_text.replace([',', '.'], "");
    let tokens: Vec<&str> = cleaned.split_whitespace().take(3).collect();
    if tokens.is_empty() {
        return None;
    }
    Some(format!("{prefix}{}", tokens.join("-")))
}
