//! Crawl frontier and admission control
//!
//! This module handles:
//! - The visited set: a link enters the frontier at most once
//! - The unbounded queue of links waiting for dispatch
//! - Global concurrency limiting via a semaphore
//! - Counting outstanding work so the crawl knows when it is finished
//!
//! A unit of work is counted from the moment its link is enqueued until its
//! task has recorded the page and enqueued the page's links. Because the
//! count is raised before the parent's unit is released, it can only reach
//! zero once no task is running and nothing is queued.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

/// Shared frontier state
#[derive(Debug)]
pub struct Frontier {
    /// Every link ever enqueued
    visited: Mutex<HashSet<String>>,

    /// Links waiting for dispatch
    sender: UnboundedSender<String>,

    /// Limits concurrently admitted tasks
    permits: Arc<Semaphore>,

    max_connections: usize,

    /// Enqueued links whose task has not finished
    outstanding: AtomicUsize,

    /// Signalled when `outstanding` drops to zero
    idle: Notify,
}

/// A link taken from the queue; its unit of outstanding work is released when
/// this is dropped
#[derive(Debug)]
pub struct WorkUnit {
    frontier: Arc<Frontier>,
    url: String,
    requeued: bool,
}

/// A unit of work holding a connection permit
#[derive(Debug)]
pub struct ScheduledFetch {
    pub unit: WorkUnit,
    pub permit: OwnedSemaphorePermit,
}

impl Frontier {
    /// Creates a new frontier
    ///
    /// # Arguments
    ///
    /// * `max_connections` - The number of tasks that may hold a permit at once
    ///
    /// # Returns
    ///
    /// The shared frontier and the receiving end of its queue
    pub fn new(max_connections: usize) -> (Arc<Self>, UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let frontier = Self {
            visited: Mutex::new(HashSet::new()),
            sender,
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
            outstanding: AtomicUsize::new(0),
            idle: Notify::new(),
        };

        (Arc::new(frontier), receiver)
    }

    /// Enqueues a link unless it was enqueued before
    ///
    /// The visited check, the outstanding count and the send happen under one
    /// lock, so a link is admitted exactly once however many tasks discover it.
    ///
    /// # Returns
    ///
    /// * `true` - The link is new and was queued
    /// * `false` - The link was already seen
    pub fn enqueue(&self, url: &str) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(|e| e.into_inner());
        if !visited.insert(url.to_string()) {
            return false;
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(url.to_string()).is_err() {
            tracing::debug!("Frontier closed, dropping {}", url);
            self.release();
            return false;
        }

        true
    }

    /// Wraps a dequeued link so its unit is released when processing ends
    pub fn claim(self: &Arc<Self>, url: String) -> WorkUnit {
        WorkUnit {
            frontier: Arc::clone(self),
            url,
            requeued: false,
        }
    }

    /// Waits for a connection permit
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledFetch)` - The unit may start fetching
    /// * `None` - The semaphore was closed
    pub async fn admit(&self, unit: WorkUnit) -> Option<ScheduledFetch> {
        let permit = self.permits.clone().acquire_owned().await.ok()?;
        Some(ScheduledFetch { unit, permit })
    }

    /// Number of links enqueued whose task has not finished
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Number of distinct links ever enqueued
    pub fn discovered(&self) -> usize {
        self.visited.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of tasks currently holding a permit
    pub fn admitted(&self) -> usize {
        self.max_connections
            .saturating_sub(self.permits.available_permits())
    }

    /// Resolves once no work is outstanding
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn requeue(&self, url: String) {
        if self.sender.send(url).is_err() {
            self.release();
        }
    }

    fn release(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl WorkUnit {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Puts the link back on the queue, bypassing the visited check
    ///
    /// The unit stays outstanding until the retried task finishes.
    pub fn requeue(mut self) {
        self.requeued = true;
        let url = std::mem::take(&mut self.url);
        self.frontier.requeue(url);
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        if !self.requeued {
            self.frontier.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_enqueue_once() {
        let (frontier, mut receiver) = Frontier::new(2);
        assert!(frontier.enqueue("https://example.com/"));
        assert!(!frontier.enqueue("https://example.com/"));
        assert!(frontier.enqueue("https://example.com/about"));

        assert_eq!(frontier.outstanding(), 2);
        assert_eq!(frontier.discovered(), 2);
        assert_eq!(receiver.try_recv().unwrap(), "https://example.com/");
        assert_eq!(receiver.try_recv().unwrap(), "https://example.com/about");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_enqueue_of_same_links() {
        let (frontier, mut receiver) = Frontier::new(2);
        let links: Vec<String> = (0..50)
            .map(|i| format!("https://example.com/page-{}", i))
            .collect();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                let links = links.clone();
                std::thread::spawn(move || {
                    links
                        .iter()
                        .filter(|link| frontier.enqueue(link.as_str()))
                        .count()
                })
            })
            .collect();
        let queued: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(queued, 50);
        assert_eq!(frontier.outstanding(), 50);
        assert_eq!(frontier.discovered(), 50);

        let mut received = Vec::new();
        while let Ok(link) = receiver.try_recv() {
            received.push(link);
        }
        assert_eq!(received.len(), 50);
        assert_eq!(received.into_iter().collect::<HashSet<_>>().len(), 50);
    }

    #[test]
    fn test_unit_released_on_drop() {
        let (frontier, mut receiver) = Frontier::new(2);
        frontier.enqueue("https://example.com/");

        let unit = frontier.claim(receiver.try_recv().unwrap());
        assert_eq!(frontier.outstanding(), 1);
        drop(unit);
        assert_eq!(frontier.outstanding(), 0);
    }

    #[test]
    fn test_requeue_keeps_unit_outstanding() {
        let (frontier, mut receiver) = Frontier::new(2);
        frontier.enqueue("https://example.com/");

        let unit = frontier.claim(receiver.try_recv().unwrap());
        unit.requeue();

        assert_eq!(frontier.outstanding(), 1);
        assert_eq!(frontier.discovered(), 1);
        assert_eq!(receiver.try_recv().unwrap(), "https://example.com/");
    }

    #[test]
    fn test_closed_queue_rejects_links() {
        let (frontier, receiver) = Frontier::new(2);
        drop(receiver);
        assert!(!frontier.enqueue("https://example.com/"));
        assert_eq!(frontier.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_admit_bounds_concurrency() {
        let (frontier, mut receiver) = Frontier::new(2);
        for path in ["a", "b", "c"] {
            frontier.enqueue(&format!("https://example.com/{}", path));
        }

        let first = frontier
            .admit(frontier.claim(receiver.recv().await.unwrap()))
            .await
            .unwrap();
        let _second = frontier
            .admit(frontier.claim(receiver.recv().await.unwrap()))
            .await
            .unwrap();
        assert_eq!(frontier.admitted(), 2);

        let third = frontier.claim(receiver.recv().await.unwrap());
        let blocked = tokio::time::timeout(Duration::from_millis(50), frontier.admit(third)).await;
        assert!(blocked.is_err());

        drop(first);
        assert_eq!(frontier.admitted(), 1);
    }

    #[tokio::test]
    async fn test_wait_idle() {
        let (frontier, mut receiver) = Frontier::new(2);
        frontier.enqueue("https://example.com/");
        let unit = frontier.claim(receiver.recv().await.unwrap());

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.wait_idle().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(unit);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_idle_when_already_idle() {
        let (frontier, _receiver) = Frontier::new(2);
        tokio::time::timeout(Duration::from_secs(1), frontier.wait_idle())
            .await
            .unwrap();
    }
}
