//! Crawl orchestration
//!
//! One unit of work per seed URL: acquire a permit, fetch and extract, release
//! the permit, append rows. Units run concurrently on the tokio runtime and are
//! joined before the run returns; a unit's failure (fetch, write, or panic) is
//! logged and counted but never affects its siblings.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::processor::{process_page, PageOutcome, PageResult};
use crate::output::{CrawlSummary, PageReport, PageStatus, ResultWriter};
use crate::seeds::SeedSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs one batch of seed URLs against a fetcher and a results sink
///
/// The coordinator owns the fetcher (normally an
/// [`HttpSession`](crate::crawler::HttpSession)) for exactly the duration of
/// [`Coordinator::run`]; it is dropped, releasing pooled connections, once
/// every unit has been joined.
pub struct Coordinator<F> {
    fetcher: Arc<F>,
    writer: Arc<ResultWriter>,
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl<F> Coordinator<F>
where
    F: PageFetcher + 'static,
{
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared fetch context for every unit
    /// * `writer` - Results sink, header already written
    /// * `max_concurrent` - Upper bound on pages being fetched at once (min 1)
    pub fn new(fetcher: F, writer: ResultWriter, max_concurrent: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            writer: Arc::new(writer),
            max_concurrent: max_concurrent.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop the crawl early
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this crawl when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Processes every seed and waits for all of them to finish
    ///
    /// Completion order across seeds is unspecified. After cancellation,
    /// pending units resolve as [`PageStatus::Cancelled`] and the join still
    /// completes.
    pub async fn run(self, seeds: &SeedSet) -> CrawlSummary {
        let start_time = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut summary = CrawlSummary::new(seeds.len());

        tracing::info!(
            seeds = seeds.len(),
            max_concurrent = self.max_concurrent,
            "Starting crawl of {} seed URLs",
            seeds.len()
        );

        let mut units = JoinSet::new();
        let mut unit_urls = HashMap::with_capacity(seeds.len());
        for url in seeds.iter() {
            let handle = units.spawn(run_unit(
                url.to_string(),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.writer),
                Arc::clone(&semaphore),
                self.cancel.clone(),
            ));
            unit_urls.insert(handle.id(), url.to_string());
        }

        while let Some(joined) = units.join_next_with_id().await {
            match joined {
                Ok((id, report)) => {
                    unit_urls.remove(&id);
                    summary.record(&report);
                }
                Err(e) => {
                    let url = unit_urls.remove(&e.id()).unwrap_or_default();
                    tracing::error!("Crawl task for {} aborted: {}", url, e);
                    summary.record_aborted(&url);
                }
            }
        }
        summary.finish();

        // Every unit has been joined; dropping the fetcher here ends the session.
        drop(self.fetcher);

        tracing::info!(
            pages = summary.pages_completed(),
            failed = summary.pages_failed,
            rows = summary.rows_written,
            "Crawl completed in {:?}",
            start_time.elapsed()
        );

        summary
    }
}

/// One seed URL: process, then write
async fn run_unit<F>(
    url: String,
    fetcher: Arc<F>,
    writer: Arc<ResultWriter>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
) -> PageReport
where
    F: PageFetcher + 'static,
{
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        permit = semaphore.acquire_owned() => permit.ok(),
    };
    let Some(permit) = permit else {
        tracing::info!("Skipping {} (crawl cancelled)", url);
        return PageReport::new(url, PageStatus::Cancelled);
    };

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!("Fetch of {} aborted (crawl cancelled)", url);
            PageResult::cancelled(url.as_str())
        }
        result = process_page(&url, fetcher.as_ref()) => result,
    };
    drop(permit);

    let links = match result.outcome {
        PageOutcome::Discovered(links) => links,
        PageOutcome::Failed(_) => return PageReport::new(url, PageStatus::Failed),
        PageOutcome::Cancelled => return PageReport::new(url, PageStatus::Cancelled),
    };

    if links.is_empty() {
        return PageReport::new(url, PageStatus::NoLinks);
    }

    let mut report = PageReport::new(url, PageStatus::Links);
    report.links_found = links.len();

    match writer.write_results(&report.source, &links).await {
        Ok(written) => {
            report.rows_written = written.written;
            report.rows_rejected = written.rejected;
        }
        Err(e) => {
            tracing::error!("Failed to write results for {}: {}", report.source, e);
            report.write_error = Some(e.to_string());
        }
    }

    report
}
