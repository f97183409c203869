//! Scripted job transport for tests: no network.

use menu_types::{JobTransport, PollOutcome, StartOutcome, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct Script {
    /// restaurant name -> queued start outcomes
    starts: HashMap<String, VecDeque<StartOutcome>>,
    /// job id -> queued poll results
    polls: HashMap<String, VecDeque<Result<PollOutcome, TransportError>>>,
    start_calls: Vec<String>,
    poll_calls: HashMap<String, usize>,
}

/// Mock transport. Unscripted starts return `Started` with a fresh job id; unscripted
/// polls return `StillRunning`.
pub struct MockJobTransport {
    script: Mutex<Script>,
    start_delay: Mutex<Duration>,
}

impl MockJobTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            start_delay: Mutex::new(Duration::ZERO),
        }
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue the outcome of the next `start_job` call for `restaurant_name`.
    pub fn on_start(&self, restaurant_name: &str, outcome: StartOutcome) -> &Self {
        self.script()
            .starts
            .entry(restaurant_name.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Queue the next poll result for `job_id`.
    pub fn on_poll(&self, job_id: &str, outcome: PollOutcome) -> &Self {
        self.script()
            .polls
            .entry(job_id.to_string())
            .or_default()
            .push_back(Ok(outcome));
        self
    }

    /// Queue a transport failure for the next poll of `job_id`.
    pub fn on_poll_error(&self, job_id: &str, message: &str) -> &Self {
        self.script()
            .polls
            .entry(job_id.to_string())
            .or_default()
            .push_back(Err(TransportError::Http(message.to_string())));
        self
    }

    /// Delay every `start_job` call, to widen the window between `Starting` and the result.
    pub fn set_start_delay(&self, delay: Duration) {
        *self.start_delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// Total `start_job` calls so far.
    pub fn start_calls(&self) -> usize {
        self.script().start_calls.len()
    }

    /// `start_job` calls for one restaurant.
    pub fn start_calls_for(&self, restaurant_name: &str) -> usize {
        self.script()
            .start_calls
            .iter()
            .filter(|n| n.as_str() == restaurant_name)
            .count()
    }

    /// `poll_job` calls for one job.
    pub fn poll_calls(&self, job_id: &str) -> usize {
        self.script().poll_calls.get(job_id).copied().unwrap_or(0)
    }
}

impl Default for MockJobTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl JobTransport for MockJobTransport {
    async fn start_job(
        &self,
        restaurant_name: &str,
        _address: &str,
        _item_limit: u32,
    ) -> Result<StartOutcome, TransportError> {
        let delay = *self.start_delay.lock().unwrap_or_else(|e| e.into_inner());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script();
        script.start_calls.push(restaurant_name.to_string());
        let scripted = script
            .starts
            .get_mut(restaurant_name)
            .and_then(|q| q.pop_front());
        Ok(scripted
            .unwrap_or_else(|| StartOutcome::Started(format!("job-{}", uuid::Uuid::new_v4()))))
    }

    async fn poll_job(&self, job_id: &str) -> Result<PollOutcome, TransportError> {
        let mut script = self.script();
        *script.poll_calls.entry(job_id.to_string()).or_insert(0) += 1;
        script
            .polls
            .get_mut(job_id)
            .and_then(|q| q.pop_front())
            .unwrap_or(Ok(PollOutcome::StillRunning))
    }
}
