//! Page registry: the record of every page a crawl attempted
//!
//! Append-only. A link is recorded at most once; later attempts to record the
//! same link are ignored.

use crate::state::page_record::PageRecord;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct RegistryInner {
    records: Vec<PageRecord>,
    links: HashSet<String>,
    succeeded: usize,
}

/// Thread-safe, append-only record of attempted pages
#[derive(Debug, Default)]
pub struct PageRegistry {
    inner: Mutex<RegistryInner>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // Records are only ever appended, so a poisoned lock still holds
        // consistent data
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a page unless its link is already present
    ///
    /// # Returns
    ///
    /// * `true` - The record was added
    /// * `false` - A record for the same link already exists
    pub fn record_if_absent(&self, record: PageRecord) -> bool {
        let mut inner = self.lock();
        if !inner.links.insert(record.link.clone()) {
            return false;
        }

        if record.status.is_success() {
            inner.succeeded += 1;
        }
        inner.records.push(record);
        true
    }

    /// Returns true if the link has been attempted
    pub fn contains(&self, link: &str) -> bool {
        self.lock().links.contains(link)
    }

    /// Number of recorded pages
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (succeeded, failed) counts
    pub fn counts(&self) -> (usize, usize) {
        let inner = self.lock();
        (inner.succeeded, inner.records.len() - inner.succeeded)
    }

    /// Every record, in the order pages were resolved
    pub fn all(&self) -> Vec<PageRecord> {
        self.lock().records.clone()
    }

    /// Records of successfully fetched pages
    pub fn succeeded(&self) -> Vec<PageRecord> {
        self.filtered(|record| record.status.is_success())
    }

    /// Records of pages that failed or were blocked
    pub fn failed(&self) -> Vec<PageRecord> {
        self.filtered(|record| !record.status.is_success())
    }

    fn filtered(&self, keep: impl Fn(&PageRecord) -> bool) -> Vec<PageRecord> {
        self.lock()
            .records
            .iter()
            .filter(|record| keep(record))
            .cloned()
            .collect()
    }
}
