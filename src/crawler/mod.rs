//! Crawler module for page fetching and link harvesting
//!
//! This module contains the core crawling logic, including:
//! - The shared HTTP session and page fetcher
//! - Textual href extraction and URL resolution
//! - Per-page processing with failure containment
//! - Bounded concurrent orchestration of one seed batch

mod extractor;
mod fetcher;
mod orchestrator;
mod processor;

pub use extractor::{extract_links, href_references, resolve_reference};
pub use fetcher::{fetch_page, HttpSession, PageFetcher};
pub use orchestrator::Coordinator;
pub use processor::{process_page, PageOutcome, PageResult};

use crate::config::Config;
use crate::output::{CrawlSummary, ResultWriter};
use crate::seeds::SeedSet;
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl of `seeds`
///
/// This is the main entry point for a crawl. It will:
/// 1. Recreate the results file and write its header
/// 2. Open the shared HTTP session
/// 3. Process every seed concurrently (bounded by configuration)
/// 4. Wait for every seed to finish, then close the session
///
/// Per-page failures do not make this return an error; only failing to
/// create the sink or the HTTP client does.
///
/// # Example
///
/// ```no_run
/// use link_harvest::config::load_config;
/// use link_harvest::crawler::crawl;
/// use link_harvest::SeedSet;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let seeds = SeedSet::load(Path::new(&config.input.seeds_path))?;
/// let summary = crawl(&config, &seeds, CancellationToken::new()).await?;
/// println!("{}", summary);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: &Config,
    seeds: &SeedSet,
    cancel: CancellationToken,
) -> Result<CrawlSummary, HarvestError> {
    let writer = ResultWriter::create(&config.output.results_path).await?;
    let session = HttpSession::new(&config.crawler, &config.user_agent)?;

    let summary = Coordinator::new(
        session,
        writer,
        config.crawler.max_concurrent_pages_open as usize,
    )
    .with_cancellation(cancel)
    .run(seeds)
    .await;

    Ok(summary)
}
