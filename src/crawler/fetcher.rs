//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared session (one pooled HTTP client per crawl)
//! - GET requests to fetch page content
//! - Error classification into [`FetchError`]
//!
//! There is no retry at this layer. A single GET either yields the body or a
//! `FetchError`.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{FetchError, FetchErrorKind};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Anything that can turn a URL into page text
///
/// The crawl is generic over this so tests can inject fetchers with fixed
/// outcomes. [`HttpSession`] is the production implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the body of `url` as text
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Connection context shared by every fetch in one crawl
///
/// Wraps a pooled [`reqwest::Client`]; cloning is cheap and shares the pool.
/// Connections are released when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    /// Builds a session from crawler and user agent configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use link_harvest::config::{CrawlerConfig, UserAgentConfig};
    /// use link_harvest::crawler::HttpSession;
    ///
    /// let session =
    ///     HttpSession::new(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
    /// ```
    pub fn new(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(Duration::from_secs(crawler.request_timeout_secs))
            .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpSession {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_page(&self.client, url).await
    }
}

/// Issues one GET for `url` and returns the decoded body
///
/// Any non-2xx status is an error; the body of an error response is not read.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::status(
            url,
            status.as_u16(),
            status.canonical_reason().unwrap_or("non-success status"),
        ));
    }

    tracing::info!(
        status = status.as_u16(),
        "Got response [{}] for URL: {}",
        status.as_u16(),
        url
    );

    response.text().await.map_err(|e| classify_error(url, &e))
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: &reqwest::Error) -> FetchError {
    if let Some(status) = error.status() {
        return FetchError::status(url, status.as_u16(), error.to_string());
    }

    let kind = if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        FetchErrorKind::Connect
    } else if error.is_body() || error.is_decode() {
        FetchErrorKind::Body
    } else {
        FetchErrorKind::Transport
    };

    FetchError::transport(url, kind, error.to_string())
}
