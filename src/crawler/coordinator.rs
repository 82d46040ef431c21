//! Crawl coordinator
//!
//! This module ties the crawl together:
//! 1. Seeds the frontier with the seed URL
//! 2. Dispatches queued links, checking robots.txt, waiting for a permit and
//!    pacing requests by the configured interval
//! 3. Runs one task per admitted link: fetch, record, discover links
//! 4. Stops once no work is outstanding

use crate::config::{Config, CrawlerConfig};
use crate::crawler::document::Document;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, ScheduledFetch};
use crate::robots::RobotsEngine;
use crate::state::{PageRecord, PageRegistry, PageStatus, TaskState};
use crate::url::{LinkClassifier, SeedOrigin};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use url::Url;

/// State shared by the dispatcher and every task
struct CrawlSession {
    settings: CrawlerConfig,
    frontier: Arc<Frontier>,
    registry: Arc<PageRegistry>,
    classifier: LinkClassifier,
    robots: Option<RobotsEngine>,
    fetcher: Arc<dyn Fetcher>,
}

/// A crawl of a single site, ready to run
pub struct Crawler {
    session: Arc<CrawlSession>,
    receiver: UnboundedReceiver<String>,
    seed: String,
}

/// Read-only view of a running crawl
#[derive(Clone)]
pub struct CrawlMonitor {
    frontier: Arc<Frontier>,
    registry: Arc<PageRegistry>,
}

/// Point-in-time crawl counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    /// Distinct links enqueued so far
    pub discovered: usize,

    /// Links queued or being processed
    pub outstanding: usize,

    /// Tasks holding a connection permit
    pub admitted: usize,

    pub succeeded: usize,
    pub failed: usize,
}

impl CrawlMonitor {
    pub fn snapshot(&self) -> CrawlProgress {
        let (succeeded, failed) = self.registry.counts();
        CrawlProgress {
            discovered: self.frontier.discovered(),
            outstanding: self.frontier.outstanding(),
            admitted: self.frontier.admitted(),
            succeeded,
            failed,
        }
    }
}

impl Crawler {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `origin` - The parsed seed URL
    /// * `fetcher` - Retrieves pages
    /// * `robots` - Parsed robots.txt; ignored unless the crawl is ethical
    pub fn new(
        config: &Config,
        origin: SeedOrigin,
        fetcher: Arc<dyn Fetcher>,
        robots: Option<RobotsEngine>,
    ) -> Self {
        let settings = config.crawler.clone();
        let (frontier, receiver) = Frontier::new(settings.max_connections);
        let classifier = LinkClassifier::for_origin(&origin, settings.ethical);
        let robots = robots.filter(|_| settings.ethical);

        let session = CrawlSession {
            settings,
            frontier,
            registry: Arc::new(PageRegistry::new()),
            classifier,
            robots,
            fetcher,
        };

        Self {
            session: Arc::new(session),
            receiver,
            seed: origin.seed.to_string(),
        }
    }

    /// Creates a crawler, loading robots.txt first when the crawl is ethical
    ///
    /// A robots.txt that cannot be fetched imposes no rules.
    pub async fn prepare(config: &Config, origin: SeedOrigin, fetcher: Arc<dyn Fetcher>) -> Self {
        let robots = if config.crawler.ethical {
            let robots_url = origin.robots_url();
            let user_agent = &config.user_agent.name;
            match RobotsEngine::load(fetcher.as_ref(), &robots_url, user_agent).await {
                Ok(robots) => Some(robots),
                Err(e) => {
                    tracing::warn!(
                        "Could not load {}: {}; crawling without robots.txt rules",
                        robots_url,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        Self::new(config, origin, fetcher, robots)
    }

    pub fn monitor(&self) -> CrawlMonitor {
        CrawlMonitor {
            frontier: Arc::clone(&self.session.frontier),
            registry: Arc::clone(&self.session.registry),
        }
    }

    /// Runs the crawl to completion
    ///
    /// Returns once every discovered link has been attempted. Failures of
    /// individual pages are recorded in the registry, never returned.
    pub async fn run(self) -> Arc<PageRegistry> {
        let monitor = self.monitor();
        let Self {
            session,
            mut receiver,
            seed,
        } = self;

        tracing::info!(
            "Starting crawl of {} with up to {} connections",
            seed,
            session.settings.max_connections
        );
        let start_time = Instant::now();
        let progress = spawn_progress_logger(
            monitor.clone(),
            Duration::from_secs(session.settings.progress_interval),
        );

        session.enqueue(&seed);

        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                Some(joined) = tasks.join_next() => report_task_end(joined),
                received = receiver.recv() => match received {
                    Some(url) => session.dispatch(url, &mut tasks).await,
                    None => break,
                },
                _ = session.frontier.wait_idle() => break,
            }
        }

        while let Some(joined) = tasks.join_next().await {
            report_task_end(joined);
        }
        if let Some(progress) = progress {
            progress.abort();
        }

        let snapshot = monitor.snapshot();
        tracing::info!(
            "Crawl completed: {} pages ({} succeeded, {} failed) in {:?}",
            snapshot.succeeded + snapshot.failed,
            snapshot.succeeded,
            snapshot.failed,
            start_time.elapsed()
        );

        Arc::clone(&session.registry)
    }
}

impl CrawlSession {
    /// Decides what happens to a dequeued link and spawns its task if admitted
    async fn dispatch(self: &Arc<Self>, url: String, tasks: &mut JoinSet<()>) {
        let unit = self.frontier.claim(url);

        if self.registry.contains(unit.url()) {
            tracing::debug!("Already recorded {}", unit.url());
            return;
        }

        if let Some(robots) = &self.robots {
            if !robots.is_allowed(unit.url()) {
                tracing::info!("URL {} disallowed by robots.txt", unit.url());
                self.record(PageRecord::failed(
                    unit.url(),
                    PageStatus::RobotsTxtDisallowed,
                ));
                return;
            }
        }

        let Some(scheduled) = self.frontier.admit(unit).await else {
            return;
        };
        transition(scheduled.unit.url(), TaskState::Admitted);

        // Paced here so consecutive fetches start at least one interval apart
        let interval = self.settings.request_interval();
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }

        let session = Arc::clone(self);
        tasks.spawn(async move { session.process(scheduled).await });
    }

    /// Fetches one page and acts on the result
    async fn process(&self, scheduled: ScheduledFetch) {
        let ScheduledFetch { unit, permit } = scheduled;
        let url = unit.url().to_string();
        transition(&url, TaskState::Fetching);
        let result = self.fetcher.fetch_page(&url).await;
        drop(permit);

        match result {
            Ok(document) => self.handle_document(&url, &document),
            Err(e) if e.is_transient() => {
                let delay = self.settings.retry_delay();
                tracing::warn!("Retrying {} in {:?}: {}", url, delay, e);
                transition(&url, TaskState::Retry);
                tokio::time::sleep(delay).await;
                unit.requeue();
            }
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", url, e);
                self.record(PageRecord::failed(url, e.status()));
            }
        }
    }

    fn handle_document(&self, url: &str, document: &Document) {
        if self.settings.ethical && document.blocked_by_meta_robots() {
            tracing::debug!("Robots meta tag blocks {}", url);
            self.record(PageRecord::failed(url, PageStatus::RobotsTagBlocked));
            return;
        }

        let canonical = document
            .find_canonical_href()
            .and_then(|href| resolve_canonical(url, href));
        self.record(PageRecord::succeeded(url, canonical));

        let discovered = self.discover(document);
        tracing::debug!("Found {} new links on {}", discovered, url);
    }

    /// Enqueues every acceptable link on the page, returning how many were new
    fn discover(&self, document: &Document) -> usize {
        document
            .find_anchors()
            .iter()
            .filter_map(|anchor| match self.classifier.classify(anchor) {
                Ok(link) => Some(link),
                Err(reason) => {
                    tracing::trace!("Skipping link {:?}: {}", anchor.href, reason);
                    None
                }
            })
            .filter(|link| self.enqueue(link.as_str()))
            .count()
    }

    fn enqueue(&self, link: &str) -> bool {
        let queued = self.frontier.enqueue(link);
        if queued {
            transition(link, TaskState::Queued);
        }
        queued
    }

    fn record(&self, record: PageRecord) {
        let state = if record.status.is_success() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        };

        let link = record.link.clone();
        if self.registry.record_if_absent(record) {
            transition(&link, state);
        } else {
            tracing::debug!("Ignoring duplicate record for {}", link);
        }
    }
}

/// Resolves a canonical href against the page it was found on
fn resolve_canonical(page: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    Url::parse(page)
        .and_then(|base| base.join(href))
        .map(String::from)
        .ok()
}

fn transition(url: &str, state: TaskState) {
    if state.is_terminal() {
        tracing::debug!("{} -> {}", url, state);
    } else {
        tracing::trace!("{} -> {}", url, state);
    }
}

fn report_task_end(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!("Crawl task panicked: {}", e);
        } else {
            tracing::debug!("Crawl task cancelled: {}", e);
        }
    }
}

fn spawn_progress_logger(monitor: CrawlMonitor, every: Duration) -> Option<JoinHandle<()>> {
    if every.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let progress = monitor.snapshot();
            tracing::info!(
                "Progress: {} discovered, {} outstanding, {} in flight, {} succeeded, {} failed",
                progress.discovered,
                progress.outstanding,
                progress.admitted,
                progress.succeeded,
                progress.failed
            );
        }
    }))
}
