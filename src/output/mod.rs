//! Output module for crawl results
//!
//! This module handles:
//! - Writing the sitemap of successfully fetched pages
//! - Printing the crawl summary and the failed-URL report

mod report;
mod sitemap;

pub use report::{format_failed_report, print_report, CrawlSummary};
pub use sitemap::{render_sitemap, sitemap_links, write_sitemap};

use thiserror::Error;

/// Output-specific errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No page was fetched successfully; nothing to write")]
    NothingToWrite,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
