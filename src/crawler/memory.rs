//! In-memory fetcher
//!
//! Serves scripted responses without touching the network. Used to drive the
//! crawler deterministically, and records how often each URL was fetched and
//! how many fetches overlapped.

use crate::crawler::document::Document;
use crate::crawler::fetcher::{FetchError, Fetcher};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

type Response = Result<String, FetchError>;

#[derive(Debug, Default)]
struct Script {
    pages: HashMap<String, VecDeque<Response>>,
    texts: HashMap<String, String>,
    fetches: HashMap<String, usize>,
    started: Vec<Instant>,
}

/// A `Fetcher` that answers from a fixed script
///
/// Each URL has a sequence of responses. Fetches consume the sequence in order
/// and the last response repeats once the others are used up. Unknown URLs
/// answer with a 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    script: Mutex<Script>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for every fetch of `url`
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_responses(url, vec![Ok(html.to_string())])
    }

    /// Fails every fetch of `url` with `error`
    pub fn with_error(self, url: &str, error: FetchError) -> Self {
        self.with_responses(url, vec![Err(error)])
    }

    /// Serves `responses` in order for successive fetches of `url`
    pub fn with_responses(self, url: &str, responses: Vec<Response>) -> Self {
        self.lock()
            .pages
            .insert(url.to_string(), responses.into_iter().collect());
        self
    }

    /// Serves `content` from `fetch_text`
    pub fn with_text(self, url: &str, content: &str) -> Self {
        self.lock()
            .texts
            .insert(url.to_string(), content.to_string());
        self
    }

    /// Delays every page fetch by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of page fetches made for `url`
    pub fn fetch_count(&self, url: &str) -> usize {
        self.lock().fetches.get(url).copied().unwrap_or(0)
    }

    /// Number of page fetches made in total
    pub fn total_fetches(&self) -> usize {
        self.lock().fetches.values().sum()
    }

    /// When each page fetch began, in call order
    pub fn fetch_starts(&self) -> Vec<Instant> {
        self.lock().started.clone()
    }

    /// The most page fetches that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_response(&self, url: &str) -> Response {
        let mut script = self.lock();
        *script.fetches.entry(url.to_string()).or_default() += 1;

        match script.pages.get_mut(url) {
            Some(responses) if responses.len() > 1 => {
                responses.pop_front().unwrap_or(Err(FetchError::Status(404)))
            }
            Some(responses) => responses
                .front()
                .cloned()
                .unwrap_or(Err(FetchError::Status(404))),
            None => Err(FetchError::Status(404)),
        }
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Document, FetchError> {
        self.lock().started.push(Instant::now());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let response = self.next_response(url);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response.map(|html| Document::parse(&html))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.lock()
            .texts
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}
