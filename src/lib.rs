//! Link-Harvest: a concurrent single-batch link harvester
//!
//! This crate fetches a fixed set of seed pages concurrently, scans each page's
//! markup for `href="..."` references, resolves them against the page URL, and
//! appends the `(source, discovered)` pairs to a tab-separated sink. Per-page
//! failures are logged and contained; they never abort the run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod seeds;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Link-Harvest operations
///
/// Only errors that prevent a run from starting surface here. Per-page
/// failures ([`FetchError`], [`ResolutionError`], [`WriteError`]) are
/// contained inside the crawl and reported through logs.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read seed list {}: {source}", .path.display())]
    Seeds {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Broad classification of a fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The server answered with a non-2xx status
    Status,
    /// The request or body read timed out
    Timeout,
    /// Connection could not be established (DNS, refused, TLS)
    Connect,
    /// The body could not be read or decoded
    Body,
    /// Any other transport-level fault, including unusable request URLs
    Transport,
}

/// A page could not be fetched
#[derive(Debug, Clone, Error)]
#[error("fetch failed for {url} [{}]: {message}", status_label(.status))]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |s| s.to_string())
}

impl FetchError {
    /// Builds an error for a non-success HTTP status
    pub fn status(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: FetchErrorKind::Status,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Builds an error for a fault that produced no HTTP status
    pub fn transport(
        url: impl Into<String>,
        kind: FetchErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            kind,
            status: None,
            message: message.into(),
        }
    }
}

/// A single href reference could not be turned into an absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("base URL {base} is not absolute: {message}")]
    InvalidBase { base: String, message: String },

    #[error("reference {reference:?} has a malformed scheme")]
    InvalidScheme { reference: String },

    #[error("reference {reference:?} could not be joined: {message}")]
    Join { reference: String, message: String },
}

/// Appending to the results sink failed
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error on sink {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{field} value {value:?} contains a tab or line break")]
    InvalidField { field: &'static str, value: String },
}

/// Result type alias for Link-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, extract_links, HttpSession, PageFetcher, PageOutcome, PageResult};
pub use output::{CrawlSummary, OutputRecord, ResultWriter};
pub use seeds::SeedSet;
