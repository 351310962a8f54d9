//! Per-run crawl statistics
//!
//! Each unit of work reports a [`PageReport`]; the orchestrator folds them into
//! a [`CrawlSummary`] after the join. Nothing here is shared between tasks.

use std::fmt;

/// Final state of one seed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Fetched, at least one link found
    Links,
    /// Fetched, no links found
    NoLinks,
    /// Fetch failed
    Failed,
    /// Crawl was cancelled before the page finished
    Cancelled,
}

/// What one unit of work did
#[derive(Debug, Clone)]
pub struct PageReport {
    pub source: String,
    pub status: PageStatus,
    pub links_found: usize,
    pub rows_written: usize,
    pub rows_rejected: usize,
    /// Set when appending this page's rows failed
    pub write_error: Option<String>,
}

impl PageReport {
    pub fn new(source: impl Into<String>, status: PageStatus) -> Self {
        Self {
            source: source.into(),
            status,
            links_found: 0,
            rows_written: 0,
            rows_rejected: 0,
            write_error: None,
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Number of seed URLs in the batch
    pub seeds: usize,
    pub pages_with_links: usize,
    pub pages_without_links: usize,
    pub pages_failed: usize,
    pub pages_cancelled: usize,
    /// Units that panicked and never reported
    pub pages_aborted: usize,
    pub links_discovered: usize,
    pub rows_written: usize,
    pub rows_rejected: usize,
    pub write_failures: usize,
    /// Seeds whose fetch failed or whose task aborted, sorted
    pub failed_urls: Vec<String>,
}

impl CrawlSummary {
    pub fn new(seeds: usize) -> Self {
        Self {
            seeds,
            ..Self::default()
        }
    }

    /// Folds one page report into the totals
    pub fn record(&mut self, report: &PageReport) {
        match report.status {
            PageStatus::Links => self.pages_with_links += 1,
            PageStatus::NoLinks => self.pages_without_links += 1,
            PageStatus::Failed => {
                self.pages_failed += 1;
                self.failed_urls.push(report.source.clone());
            }
            PageStatus::Cancelled => self.pages_cancelled += 1,
        }
        self.links_discovered += report.links_found;
        self.rows_written += report.rows_written;
        self.rows_rejected += report.rows_rejected;
        if report.write_error.is_some() {
            self.write_failures += 1;
        }
    }

    /// Counts a unit whose task ended without producing a report
    pub fn record_aborted(&mut self, source: &str) {
        self.pages_aborted += 1;
        self.failed_urls.push(source.to_string());
    }

    /// Sorts the per-URL lists so output is stable across runs
    pub fn finish(&mut self) {
        self.failed_urls.sort();
    }

    /// Pages that reached a final state, aborted units included
    pub fn pages_completed(&self) -> usize {
        self.pages_with_links
            + self.pages_without_links
            + self.pages_failed
            + self.pages_cancelled
            + self.pages_aborted
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Summary ===")?;
        writeln!(f)?;
        writeln!(f, "Pages:")?;
        writeln!(f, "  Seeds: {}", self.seeds)?;
        writeln!(f, "  With links: {}", self.pages_with_links)?;
        writeln!(f, "  Without links: {}", self.pages_without_links)?;
        writeln!(f, "  Failed: {}", self.pages_failed)?;
        if self.pages_cancelled > 0 {
            writeln!(f, "  Cancelled: {}", self.pages_cancelled)?;
        }
        if self.pages_aborted > 0 {
            writeln!(f, "  Aborted: {}", self.pages_aborted)?;
        }
        writeln!(f)?;
        writeln!(f, "Output:")?;
        writeln!(f, "  Links discovered: {}", self.links_discovered)?;
        writeln!(f, "  Rows written: {}", self.rows_written)?;
        if self.rows_rejected > 0 {
            writeln!(f, "  Rows rejected: {}", self.rows_rejected)?;
        }
        if self.write_failures > 0 {
            writeln!(f, "  Write failures: {}", self.write_failures)?;
        }

        if !self.failed_urls.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed URLs ({}):", self.failed_urls.len())?;
            for url in &self.failed_urls {
                writeln!(f, "  - {}", url)?;
            }
        }
        Ok(())
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", summary);
}
