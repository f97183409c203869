//! Prefetch entry and its status state machine.

use crate::MenuItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one restaurant's prefetch: `Idle -> Starting -> Running -> {Completed | Failed}`.
///
/// `Starting -> Failed` is also valid when the start call itself is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefetchStatus {
    #[default]
    Idle,
    Starting,
    Running,
    Completed,
    Failed,
}

impl PrefetchStatus {
    fn rank(self) -> u8 {
        match self {
            PrefetchStatus::Idle => 0,
            PrefetchStatus::Starting => 1,
            PrefetchStatus::Running => 2,
            PrefetchStatus::Completed | PrefetchStatus::Failed => 3,
        }
    }

    /// Completed or Failed: no further polling happens for the job.
    pub fn is_terminal(self) -> bool {
        self.rank() == 3
    }

    /// True when moving to `next` keeps the status monotonic.
    pub fn can_advance_to(self, next: PrefetchStatus) -> bool {
        next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrefetchStatus::Idle => "idle",
            PrefetchStatus::Starting => "starting",
            PrefetchStatus::Running => "running",
            PrefetchStatus::Completed => "completed",
            PrefetchStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PrefetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One restaurant's in-flight or finished prefetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchEntry {
    pub key: String,
    pub restaurant_name: String,
    pub address: String,
    /// Empty until the job API accepts the job.
    #[serde(default)]
    pub job_id: String,
    pub status: PrefetchStatus,
    /// Present only once `status` is Completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<MenuItem>>,
    pub started_at: DateTime<Utc>,
}

impl PrefetchEntry {
    /// New attempt for `key`, already in `Starting`.
    pub fn starting(
        key: impl Into<String>,
        restaurant_name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            restaurant_name: restaurant_name.into(),
            address: address.into(),
            job_id: String::new(),
            status: PrefetchStatus::Starting,
            data: None,
            started_at: Utc::now(),
        }
    }

    /// Completed with at least one menu item.
    pub fn is_ready(&self) -> bool {
        self.status == PrefetchStatus::Completed
            && self.data.as_ref().is_some_and(|d| !d.is_empty())
    }

    fn advance(&mut self, next: PrefetchStatus) -> bool {
        if !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    /// Record the accepted job id. Returns false if the entry is already past `Starting`.
    pub fn mark_running(&mut self, job_id: impl Into<String>) -> bool {
        if !self.advance(PrefetchStatus::Running) {
            return false;
        }
        self.job_id = job_id.into();
        true
    }

    /// Store the job result. Returns false if the entry is already terminal.
    pub fn mark_completed(&mut self, data: Vec<MenuItem>) -> bool {
        if !self.advance(PrefetchStatus::Completed) {
            return false;
        }
        self.data = Some(data);
        true
    }

    /// Returns false if the entry is already terminal.
    pub fn mark_failed(&mut self) -> bool {
        self.advance(PrefetchStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_moves_forward() {
        let mut entry = PrefetchEntry::starting("p1", "Joe's", "1 Main St");
        assert!(entry.job_id.is_empty());
        assert!(entry.mark_running("j1"));
        assert_eq!(entry.job_id, "j1");
        assert!(!entry.mark_running("j2"));
        assert_eq!(entry.job_id, "j1");
        assert!(entry.mark_completed(vec![MenuItem::new("a")]));
        assert!(!entry.mark_failed());
        assert_eq!(entry.status, PrefetchStatus::Completed);
        assert!(entry.is_ready());
    }

    #[test]
    fn failed_start_keeps_empty_job_id() {
        let mut entry = PrefetchEntry::starting("p1", "Joe's", "1 Main St");
        assert!(entry.mark_failed());
        assert_eq!(entry.status, PrefetchStatus::Failed);
        assert!(entry.job_id.is_empty());
        assert!(!entry.mark_completed(vec![MenuItem::new("a")]));
        assert!(entry.data.is_none());
    }

    #[test]
    fn completed_without_items_is_not_ready() {
        let mut entry = PrefetchEntry::starting("p1", "Joe's", "1 Main St");
        assert!(entry.mark_completed(Vec::new()));
        assert!(!entry.is_ready());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(PrefetchStatus::Running).unwrap(),
            serde_json::json!("running")
        );
        assert_eq!(PrefetchStatus::default(), PrefetchStatus::Idle);
        assert!(PrefetchStatus::Failed.is_terminal());
        assert!(!PrefetchStatus::Completed.can_advance_to(PrefetchStatus::Failed));
    }
}
