//! Crawl report
//!
//! Summarizes a finished crawl and lists every page that could not be
//! fetched, one `<status-code> <url>` line each.

use crate::state::{PageRecord, PageRegistry};

/// Aggregate counts for a finished crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub total_pages: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Failed pages the crawler chose not to follow
    pub blocked: usize,
}

impl CrawlSummary {
    pub fn from_registry(registry: &PageRegistry) -> Self {
        let records = registry.all();
        let succeeded = records.iter().filter(|r| r.status.is_success()).count();
        let blocked = records.iter().filter(|r| r.status.is_policy_block()).count();

        Self {
            total_pages: records.len(),
            succeeded,
            failed: records.len() - succeeded,
            blocked,
        }
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total_pages as f64) * 100.0
    }
}

/// Formats failed records, one `<status-code> <url>` line each
pub fn format_failed_report(records: &[PageRecord]) -> String {
    let mut report = String::new();
    for record in records.iter().filter(|r| !r.status.is_success()) {
        report.push_str(&format!("{} {}\n", record.status_code(), record.link));
    }
    report
}

/// Prints the crawl summary and the failed pages to stdout
pub fn print_report(registry: &PageRegistry) {
    let summary = CrawlSummary::from_registry(registry);

    println!("=== Crawl Summary ===\n");
    println!("Total Pages: {}", summary.total_pages);
    println!("URL Found OK: {}", summary.succeeded);
    println!(
        "URL Found NOK: {} ({} blocked by robots directives)",
        summary.failed, summary.blocked
    );
    println!("Success Rate: {:.2}%", summary.success_rate());

    let failed = format_failed_report(&registry.failed());
    if !failed.is_empty() {
        println!("\nFailed URLs:");
        print!("{}", failed);
    }
}
