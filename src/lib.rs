//! Podscrape Core Library
//!
//! This library crawls a paginated podcast index, resolves each episode's
//! detail page to its downloadable assets, and mirrors those assets to local
//! storage with idempotent resume and bounded parallelism.
//!
//! # Architecture
//!
//! Data flows strictly downstream through the modules:
//! - [`crawl`] - page-count discovery and index page URL enumeration
//! - [`page`] - selector/pattern queries over fetched HTML bodies
//! - [`resolve`] - detail page URL → (audio, document) download jobs
//! - [`download`] - bounded worker pool executing idempotent streamed downloads
//! - [`orchestrator`] - sequential page loop tying the stages together
//!
//! Cross-cutting pieces:
//! - [`fetch`] - HTTP client with fixed headers and per-request timeout
//! - [`site`] - injectable site adapter (selectors, patterns, URL templates)
//! - [`config`] - externally settable runtime knobs

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod crawl;
pub mod download;
pub mod fetch;
pub mod orchestrator;
pub mod page;
pub mod resolve;
pub mod site;

// Re-export commonly used types
pub use config::Settings;
pub use crawl::IndexCrawler;
pub use download::{
    BatchStats, DEFAULT_POOL_WIDTH, DownloadEngine, DownloadError, DownloadJob, EngineError,
    JobOutcome,
};
pub use fetch::{DEFAULT_TIMEOUT_SECS, FetchError, HttpClient};
pub use orchestrator::{Orchestrator, PipelineError, RunSummary};
pub use resolve::{AssetResolver, JobPair, derive_stem};
pub use site::{SiteConfig, SiteConfigError};
