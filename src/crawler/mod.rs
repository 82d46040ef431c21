//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML parsing into anchors and robots metadata
//! - The frontier: deduplication, admission and completion tracking
//! - Overall crawl coordination

mod coordinator;
mod document;
mod fetcher;
mod frontier;
mod memory;

pub use coordinator::{CrawlMonitor, CrawlProgress, Crawler};
pub use document::{forbids_indexing_or_following, Document};
pub use fetcher::{build_http_client, is_resource_exhausted, FetchError, Fetcher, HttpFetcher};
pub use memory::MemoryFetcher;

use crate::config::Config;
use crate::state::PageRegistry;
use crate::url::SeedOrigin;
use std::sync::Arc;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Parse the seed URL
/// 2. Build the HTTP client
/// 3. Load robots.txt if the crawl is ethical
/// 4. Crawl every reachable in-domain page
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL the crawl starts from
///
/// # Returns
///
/// * `Ok(PageRegistry)` - Every attempted page with its outcome
/// * `Err(CrawlError)` - The seed is invalid or the client could not be built
pub async fn crawl(config: &Config, seed: &str) -> crate::Result<Arc<PageRegistry>> {
    let origin = SeedOrigin::parse(seed)?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config)?);

    let crawler = Crawler::prepare(config, origin, fetcher).await;
    Ok(crawler.run().await)
}
