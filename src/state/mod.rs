//! State module for tracking crawl results
//!
//! # Components
//!
//! - `PageRecord`: The outcome of one attempted page
//! - `PageRegistry`: The thread-safe, append-only set of records
//! - `TaskState`: Where a single link is in its fetch lifecycle

mod page_record;
mod registry;
mod task_state;

// Re-export main types
pub use page_record::{PageRecord, PageStatus};
pub use registry::PageRegistry;
pub use task_state::TaskState;
