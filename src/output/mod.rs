//! Output module for crawl results
//!
//! This module handles:
//! - The tab-separated results sink and its serialized append discipline
//! - Recording crawl statistics for the end-of-run summary

pub mod stats;
mod writer;

pub use stats::{print_summary, CrawlSummary, PageReport, PageStatus};
pub use writer::{OutputRecord, ResultWriter, WriteReport, HEADER};
