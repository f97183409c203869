//! Poll worker: drives one job's entry from Running to Completed or Failed.

use crate::coordinator::{lock, SharedState};
use crate::{PrefetchConfig, PrefetchError};
use menu_types::{JobTransport, PollOutcome, PrefetchEntry};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub(crate) struct PollWorker {
    key: String,
    job_id: String,
    cancel: CancellationToken,
    transport: Arc<dyn JobTransport>,
    state: SharedState,
    poll_interval: Duration,
    timeout: Duration,
}

impl PollWorker {
    pub(crate) fn new(
        key: String,
        job_id: String,
        cancel: CancellationToken,
        transport: Arc<dyn JobTransport>,
        state: SharedState,
        config: &PrefetchConfig,
    ) -> Self {
        Self {
            key,
            job_id,
            cancel,
            transport,
            state,
            poll_interval: config.poll_interval,
            timeout: config.timeout,
        }
    }

    /// `run`, with the exit reason logged. This is what gets spawned.
    pub(crate) async fn run_logged(self) {
        let key = self.key.clone();
        let job_id = self.job_id.clone();
        match self.run().await {
            Ok(count) => {
                tracing::info!(key = %key, job_id = %job_id, items = count, "menu prefetched")
            }
            Err(PrefetchError::Superseded) => {
                tracing::debug!(key = %key, job_id = %job_id, "poll worker superseded")
            }
            Err(e) => tracing::warn!(key = %key, job_id = %job_id, error = %e, "menu prefetch failed"),
        }
    }

    /// Poll until a terminal status, cancellation, or the deadline.
    ///
    /// Returns the reported item count on completion. Every `Err` except `Superseded`
    /// has already been committed to the entry as Failed.
    pub(crate) async fn run(self) -> Result<usize, PrefetchError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if !self.still_wanted() {
                return Err(PrefetchError::Superseded);
            }
            if Instant::now() >= deadline {
                return self.fail(PrefetchError::Timeout(self.timeout));
            }

            // Cancellation does not abort an in-flight poll; it only blocks the commit.
            match tokio::time::timeout_at(deadline, self.transport.poll_job(&self.job_id)).await {
                Ok(Ok(PollOutcome::Completed { data, count })) => {
                    self.commit(|entry| entry.mark_completed(data))?;
                    return Ok(count);
                }
                Ok(Ok(PollOutcome::Failed(reason))) => {
                    return self.fail(PrefetchError::JobFailed(reason));
                }
                Ok(Ok(PollOutcome::NotFound)) => {
                    return self.fail(PrefetchError::JobFailed("job not found".to_string()));
                }
                Ok(Ok(PollOutcome::StillRunning)) => {
                    tracing::debug!(key = %self.key, job_id = %self.job_id, "menu job still running");
                }
                Ok(Err(e)) => {
                    tracing::warn!(key = %self.key, job_id = %self.job_id, error = %e, "poll failed; retrying");
                }
                Err(_) => continue,
            }

            let wake = (Instant::now() + self.poll_interval).min(deadline);
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(PrefetchError::Superseded),
                _ = tokio::time::sleep_until(wake) => {}
            }
        }
    }

    fn still_wanted(&self) -> bool {
        lock(&self.state).is_current(&self.key, &self.job_id, &self.cancel)
    }

    fn fail(&self, err: PrefetchError) -> Result<usize, PrefetchError> {
        self.commit(PrefetchEntry::mark_failed)?;
        Err(err)
    }

    /// Apply `update` to the entry if this worker is still the current one. The relevance
    /// check and the write happen under the same lock the coordinator uses to supersede.
    fn commit(&self, update: impl FnOnce(&mut PrefetchEntry) -> bool) -> Result<(), PrefetchError> {
        let mut state = lock(&self.state);
        if !state.is_current(&self.key, &self.job_id, &self.cancel) {
            return Err(PrefetchError::Superseded);
        }
        let applied = match state.store.get_mut(&self.key) {
            Some(entry) if entry.job_id == self.job_id => update(entry),
            _ => false,
        };
        state.finish(&self.key, &self.job_id);
        if applied {
            Ok(())
        } else {
            Err(PrefetchError::Superseded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_transport::MockJobTransport;
    use menu_types::{MenuItem, PrefetchStatus};

    fn running_state(job_id: &str) -> SharedState {
        let state = SharedState::default();
        {
            let mut s = lock(&state);
            s.active_key = Some("p1".to_string());
            let mut entry = PrefetchEntry::starting("p1", "Joe's", "1 Main St");
            entry.mark_running(job_id);
            s.store.put("p1", entry);
        }
        state
    }

    fn completed(name: &str) -> PollOutcome {
        PollOutcome::Completed {
            data: vec![MenuItem::new(name)],
            count: 1,
        }
    }

    #[tokio::test]
    async fn unarmed_worker_exits_without_polling() {
        let state = running_state("j1");
        let transport = Arc::new(MockJobTransport::new());
        transport.on_poll("j1", completed("a"));
        let worker = PollWorker::new(
            "p1".to_string(),
            "j1".to_string(),
            CancellationToken::new(),
            transport.clone(),
            Arc::clone(&state),
            &PrefetchConfig::default(),
        );

        assert!(matches!(worker.run().await, Err(PrefetchError::Superseded)));
        assert_eq!(transport.poll_calls("j1"), 0);
        assert_eq!(
            lock(&state).store.get("p1").unwrap().status,
            PrefetchStatus::Running
        );
    }

    #[tokio::test]
    async fn result_for_replaced_job_is_dropped() {
        // The store already holds a newer attempt (j2) while j1 is still armed.
        let state = running_state("j2");
        let cancel = lock(&state).arm("p1", "j1");
        let transport = Arc::new(MockJobTransport::new());
        transport.on_poll("j1", completed("stale"));
        let worker = PollWorker::new(
            "p1".to_string(),
            "j1".to_string(),
            cancel,
            transport.clone(),
            Arc::clone(&state),
            &PrefetchConfig::default(),
        );

        assert!(matches!(worker.run().await, Err(PrefetchError::Superseded)));
        let s = lock(&state);
        let entry = s.store.get("p1").unwrap();
        assert_eq!(entry.job_id, "j2");
        assert!(entry.data.is_none());
    }

    #[tokio::test]
    async fn armed_worker_commits_completion() {
        let state = running_state("j1");
        let cancel = lock(&state).arm("p1", "j1");
        let transport = Arc::new(MockJobTransport::new());
        transport.on_poll("j1", completed("pho"));
        let worker = PollWorker::new(
            "p1".to_string(),
            "j1".to_string(),
            cancel.clone(),
            transport,
            Arc::clone(&state),
            &PrefetchConfig::default(),
        );

        assert_eq!(worker.run().await.unwrap(), 1);
        let s = lock(&state);
        assert!(s.store.get("p1").unwrap().is_ready());
        // A finished worker is no longer tracked as live.
        assert!(!s.is_current("p1", "j1", &cancel));
    }
}
