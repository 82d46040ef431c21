/// Task state definitions for tracking a link through the crawl
///
/// Every link admitted to the frontier moves through these states exactly
/// once, except `Retry`, which sends it back to `Queued`.
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Link is in the frontier, waiting for dispatch
    Queued,

    /// Holds a connection permit, waiting out the request interval
    Admitted,

    /// The request is in flight
    Fetching,

    // ===== Terminal States =====
    /// Page was fetched, recorded and its links discovered
    Succeeded,

    /// Page was recorded with a failure status
    Failed,

    // ===== Special States =====
    /// Local resources ran out; the link goes back to the frontier
    Retry,
}

impl TaskState {
    /// Returns true if no further work happens for the link
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Admitted => "admitted",
            Self::Fetching => "fetching",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
