//! Request and response DTOs for the menu extraction job API.

use crate::{PollOutcome, StartOutcome};
use serde::{Deserialize, Serialize};

/// One menu item produced by an extraction job.
///
/// Only `name` is lifted out; every other field is carried through untouched for the
/// caller to map into its own view models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl MenuItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: serde_json::Map::new(),
        }
    }
}

/// Body of the start-job request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    pub restaurant_name: String,
    pub address: String,
    pub item_limit: u32,
}

/// Start-job response, discriminated by `ok` and `status`:
/// `{ok:true, status:"already_cached", data}`, `{ok:true, status:"started", jobId}`
/// or `{ok:false, message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobResponse {
    pub ok: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<MenuItem>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StartJobResponse {
    /// Resolve the response envelope into a start outcome.
    pub fn into_outcome(self) -> StartOutcome {
        if !self.ok {
            return StartOutcome::Rejected(
                self.message
                    .unwrap_or_else(|| "start request rejected".to_string()),
            );
        }
        let job_id = self.job_id.filter(|id| !id.is_empty());
        match (self.status.as_deref(), job_id, self.data) {
            (Some("already_cached"), _, data) => {
                StartOutcome::AlreadyAvailable(data.unwrap_or_default())
            }
            (Some("started"), Some(job_id), _) => StartOutcome::Started(job_id),
            (Some("started"), None, _) => {
                StartOutcome::Rejected("job started without a jobId".to_string())
            }
            // Unknown status: trust whatever payload is present.
            (_, Some(job_id), _) => StartOutcome::Started(job_id),
            (_, None, Some(data)) => StartOutcome::AlreadyAvailable(data),
            (status, None, None) => StartOutcome::Rejected(format!(
                "unexpected start status: {}",
                status.unwrap_or("<none>")
            )),
        }
    }
}

/// Poll-job response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollJobResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<Vec<MenuItem>>,
    #[serde(default)]
    pub result_count: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PollJobResponse {
    /// Resolve the job status string into a poll outcome.
    pub fn into_outcome(self) -> PollOutcome {
        match self.status.as_str() {
            "completed" => {
                let data = self.data.unwrap_or_default();
                let count = self.result_count.unwrap_or(data.len());
                PollOutcome::Completed { data, count }
            }
            "failed" => {
                PollOutcome::Failed(self.error.unwrap_or_else(|| "job failed".to_string()))
            }
            "not_found" => PollOutcome::NotFound,
            _ => PollOutcome::StillRunning,
        }
    }
}
