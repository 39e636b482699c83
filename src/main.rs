//! CLI entry point for the podscrape tool.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use podscrape_core::{Orchestrator, RunSummary, SiteConfig};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Podscrape starting");

    let started = Instant::now();
    let result = run(&args).await;
    let elapsed_secs = started.elapsed().as_secs_f64();

    // Elapsed time is reported on both paths, matching the contract that the
    // operator always sees wall-clock time before exit.
    match result {
        Ok(summary) => {
            info!(
                pages = summary.pages,
                completed = summary.completed,
                skipped = summary.skipped,
                failed = summary.failed,
                elapsed_secs,
                "Crawl complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, elapsed_secs, "Crawl failed");
            Err(e)
        }
    }
}

/// Builds the pipeline from arguments and runs it.
async fn run(args: &Args) -> Result<RunSummary> {
    let site = match &args.site_config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };
    // A broken pattern or selector is a configuration error, not a soft fail.
    site.validate()?;

    let orchestrator = Orchestrator::new(site, args.settings())?;
    Ok(orchestrator.run().await?)
}
