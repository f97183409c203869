//! Transport trait for the menu extraction job API.

use crate::MenuItem;
use async_trait::async_trait;

/// Result of asking the job API to start an extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// Job accepted; poll it by this id.
    Started(String),
    /// The server already had a finished analysis for this restaurant.
    AlreadyAvailable(Vec<MenuItem>),
    /// The server refused the request (bad input, quota, ...).
    Rejected(String),
}

/// Result of one status poll for a job.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed { data: Vec<MenuItem>, count: usize },
    Failed(String),
    NotFound,
    StillRunning,
}

/// Thin I/O boundary to the job API. Implementations hold no prefetch state and never retry.
///
/// Contract: `start_job` may be called more than once for the same restaurant; server-side
/// de-duplication is assumed but not guaranteed, so callers should avoid it.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Ask the server to start (or reuse) an extraction job.
    async fn start_job(
        &self,
        restaurant_name: &str,
        address: &str,
        item_limit: u32,
    ) -> Result<StartOutcome, TransportError>;

    /// Fetch the current status of a job.
    async fn poll_job(&self, job_id: &str) -> Result<PollOutcome, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
}
