//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests for pages and for robots.txt
//! - `X-Robots-Tag` enforcement in ethical mode
//! - Error classification into page status codes

use crate::config::Config;
use crate::crawler::document::{forbids_indexing_or_following, Document};
use crate::state::PageStatus;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// "Too many open files" for the process
const EMFILE: i32 = 24;
/// "Too many open files" for the system
const ENFILE: i32 = 23;

/// Why a fetch did not produce a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status code {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("page cannot be followed or indexed")]
    RobotsTag,

    /// The local machine ran out of sockets or file descriptors; the fetch
    /// should be retried later
    #[error("local resources exhausted: {0}")]
    ResourceExhausted(String),
}

impl FetchError {
    /// Returns true if the fetch should be retried instead of recorded
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }

    /// The status recorded for a page that failed with this error
    pub fn status(&self) -> PageStatus {
        match self {
            Self::Request(_) | Self::ResourceExhausted(_) => PageStatus::RequestError,
            Self::Status(code) => PageStatus::Http(*code),
            Self::Body(_) => PageStatus::ParseError,
            Self::RobotsTag => PageStatus::RobotsTagBlocked,
        }
    }
}

/// Retrieves pages for the crawler
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches and parses a page
    async fn fetch_page(&self, url: &str) -> Result<Document, FetchError>;

    /// Fetches a plain-text resource such as robots.txt
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed with reqwest's default policy.
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
/// * `timeout` - Total timeout for each request
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    honor_robots_tag: bool,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent.name,
            config.crawler.request_timeout(),
        )?;

        Ok(Self {
            client,
            honor_robots_tag: config.crawler.ethical,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(e, FetchError::Request))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Document, FetchError> {
        let response = self.get(url).await?;

        if self.honor_robots_tag {
            let blocked = response
                .headers()
                .get_all("x-robots-tag")
                .iter()
                .filter_map(|value| value.to_str().ok())
                .any(forbids_indexing_or_following);
            if blocked {
                return Err(FetchError::RobotsTag);
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(e, FetchError::Body))?;

        Ok(Document::parse(&body))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| classify_error(e, FetchError::Body))
    }
}

/// Maps a reqwest error to `ResourceExhausted` when it stems from descriptor
/// exhaustion, or to `fallback` otherwise
fn classify_error(error: reqwest::Error, fallback: fn(String) -> FetchError) -> FetchError {
    if is_resource_exhausted(&error) {
        FetchError::ResourceExhausted(error.to_string())
    } else {
        fallback(error.to_string())
    }
}

/// Returns true if any error in the source chain reports that the process
/// or system ran out of file descriptors
pub fn is_resource_exhausted(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);

    while let Some(err) = current {
        if let Some(io_error) = err.downcast_ref::<std::io::Error>() {
            if matches!(io_error.raw_os_error(), Some(EMFILE) | Some(ENFILE)) {
                return true;
            }
        }

        if err
            .to_string()
            .to_ascii_lowercase()
            .contains("too many open files")
        {
            return true;
        }

        current = err.source();
    }

    false
}
