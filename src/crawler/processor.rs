//! Per-page processing: fetch, then extract
//!
//! Failures never leave this module. A page that cannot be fetched degrades to
//! an empty link set, but the [`PageOutcome`] still records *why* it is empty
//! so a failed fetch is never confused with a page that had no links.

use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::PageFetcher;
use crate::FetchError;
use std::collections::HashSet;

/// What happened to one seed page
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// Fetched and scanned; the set may be empty
    Discovered(HashSet<String>),
    /// The fetch failed
    Failed(FetchError),
    /// The crawl was cancelled before the page finished
    Cancelled,
}

/// Result of processing one seed URL
#[derive(Debug, Clone)]
pub struct PageResult {
    pub source: String,
    pub outcome: PageOutcome,
}

impl PageResult {
    pub fn cancelled(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            outcome: PageOutcome::Cancelled,
        }
    }

    /// The discovered links; empty for failed or cancelled pages
    pub fn links(&self) -> HashSet<String> {
        match &self.outcome {
            PageOutcome::Discovered(links) => links.clone(),
            PageOutcome::Failed(_) | PageOutcome::Cancelled => HashSet::new(),
        }
    }

    /// Consumes the result, yielding the discovered links
    pub fn into_links(self) -> HashSet<String> {
        match self.outcome {
            PageOutcome::Discovered(links) => links,
            PageOutcome::Failed(_) | PageOutcome::Cancelled => HashSet::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PageOutcome::Failed(_))
    }
}

/// Fetches `url` and extracts its links
///
/// Never returns an error: fetch failures are logged with their status and
/// message and become [`PageOutcome::Failed`].
pub async fn process_page<F>(url: &str, fetcher: &F) -> PageResult
where
    F: PageFetcher + ?Sized,
{
    let outcome = match fetcher.fetch(url).await {
        Ok(html) => {
            let found = extract_links(&html, url);
            if found.is_empty() {
                tracing::info!("Found 0 links for {} (page fetched, no hrefs resolved)", url);
            } else {
                tracing::info!(count = found.len(), "Found {} links for {}", found.len(), url);
            }
            PageOutcome::Discovered(found)
        }
        Err(e) => {
            tracing::error!(
                status = ?e.status,
                kind = ?e.kind,
                "Fetch failed for {} [{}]: {}",
                url,
                e.status.map_or_else(|| "-".to_string(), |s| s.to_string()),
                e.message
            );
            PageOutcome::Failed(e)
        }
    };

    PageResult {
        source: url.to_string(),
        outcome,
    }
}
