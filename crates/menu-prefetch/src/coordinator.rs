//! Coordinator: one active restaurant, at most one live poll worker per key.

use crate::worker::PollWorker;
use crate::{PrefetchConfig, PrefetchError, PrefetchStore};
use menu_types::{JobTransport, PrefetchEntry, PrefetchStatus, StartOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Job a worker is currently polling for a key.
struct LiveJob {
    job_id: String,
    cancel: CancellationToken,
}

/// Everything shared between the coordinator and its workers. Guarded by one mutex.
#[derive(Default)]
pub(crate) struct CoordinatorState {
    pub(crate) store: PrefetchStore,
    pub(crate) active_key: Option<String>,
    live: HashMap<String, LiveJob>,
    /// key -> attempt number of the entry currently in the store
    attempts: HashMap<String, u64>,
    next_attempt: u64,
}

impl CoordinatorState {
    fn begin_attempt(&mut self, key: &str) -> u64 {
        self.next_attempt += 1;
        self.attempts.insert(key.to_string(), self.next_attempt);
        self.next_attempt
    }

    fn disown(&mut self, key: &str) {
        if let Some(job) = self.live.remove(key) {
            job.cancel.cancel();
            tracing::debug!(key = %key, job_id = %job.job_id, "disowned poll worker");
        }
    }

    pub(crate) fn arm(&mut self, key: &str, job_id: &str) -> CancellationToken {
        let cancel = CancellationToken::new();
        self.live.insert(
            key.to_string(),
            LiveJob {
                job_id: job_id.to_string(),
                cancel: cancel.clone(),
            },
        );
        cancel
    }

    /// True while the worker for `job_id` is still the one the coordinator wants results from.
    pub(crate) fn is_current(&self, key: &str, job_id: &str, cancel: &CancellationToken) -> bool {
        !cancel.is_cancelled()
            && self.active_key.as_deref() == Some(key)
            && self
                .live
                .get(key)
                .is_some_and(|job| job.job_id == job_id)
    }

    /// Worker reached a terminal state; forget its live job.
    pub(crate) fn finish(&mut self, key: &str, job_id: &str) {
        if self.live.get(key).is_some_and(|job| job.job_id == job_id) {
            self.live.remove(key);
        }
    }
}

pub(crate) type SharedState = Arc<Mutex<CoordinatorState>>;

pub(crate) fn lock(state: &Mutex<CoordinatorState>) -> MutexGuard<'_, CoordinatorState> {
    // Poisoning is ignored: the state is plain data.
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Public entry point for the UI layer.
///
/// `prefetch` is the only async operation: it awaits the start call and then returns,
/// leaving polling to a spawned worker. All reads are synchronous.
pub struct PrefetchCoordinator {
    transport: Arc<dyn JobTransport>,
    config: PrefetchConfig,
    state: SharedState,
}

impl PrefetchCoordinator {
    pub fn new(transport: Arc<dyn JobTransport>, config: PrefetchConfig) -> Self {
        Self {
            transport,
            config,
            state: Arc::new(Mutex::new(CoordinatorState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        lock(&self.state)
    }

    /// Make `key` the active restaurant and make sure its menu is on the way.
    ///
    /// Returns the entry as it stands after the start step; it never waits for polling.
    /// Must be called inside a tokio runtime since a started job spawns a poll task.
    pub async fn prefetch(&self, key: &str, restaurant_name: &str, address: &str) -> PrefetchEntry {
        let (attempt, mut entry) = {
            let mut state = self.lock();
            if state.active_key.as_deref() == Some(key) {
                if let Some(existing) = state.store.get(key) {
                    if matches!(
                        existing.status,
                        PrefetchStatus::Starting | PrefetchStatus::Running | PrefetchStatus::Completed
                    ) {
                        return existing.clone();
                    }
                }
            }
            if let Some(prev) = state.active_key.take() {
                if prev != key {
                    state.disown(&prev);
                }
            }
            state.active_key = Some(key.to_string());
            if let Some(existing) = state.store.get(key) {
                if existing.is_ready() {
                    tracing::debug!(key = %key, "menu already prefetched");
                    return existing.clone();
                }
            }
            state.disown(key);
            let attempt = state.begin_attempt(key);
            let entry = PrefetchEntry::starting(key, restaurant_name, address);
            state.store.put(key, entry.clone());
            (attempt, entry)
        };

        tracing::info!(key = %key, restaurant = %restaurant_name, "starting menu job");
        let outcome = self
            .transport
            .start_job(restaurant_name, address, self.config.item_limit)
            .await;

        let mut started = None;
        match outcome {
            Ok(StartOutcome::Started(job_id)) => {
                entry.mark_running(job_id.clone());
                started = Some(job_id);
            }
            Ok(StartOutcome::AlreadyAvailable(data)) => {
                tracing::info!(key = %key, items = data.len(), "menu already available");
                entry.mark_completed(data);
            }
            Ok(StartOutcome::Rejected(reason)) => {
                let err = PrefetchError::TransportRejected(reason);
                tracing::warn!(key = %key, error = %err, "menu job not started");
                entry.mark_failed();
            }
            Err(e) => {
                let err = PrefetchError::TransportRejected(e.to_string());
                tracing::warn!(key = %key, error = %err, "menu job not started");
                entry.mark_failed();
            }
        }

        let mut state = self.lock();
        if state.attempts.get(key) != Some(&attempt) {
            tracing::debug!(key = %key, "prefetch attempt replaced during start; result dropped");
            return entry;
        }
        state.store.put(key, entry.clone());

        if let Some(job_id) = started {
            if state.active_key.as_deref() != Some(key) {
                tracing::debug!(key = %key, job_id = %job_id, "superseded before polling began");
                return entry;
            }
            let cancel = state.arm(key, &job_id);
            let worker = PollWorker::new(
                key.to_string(),
                job_id.clone(),
                cancel,
                Arc::clone(&self.transport),
                Arc::clone(&self.state),
                &self.config,
            );
            tracing::info!(key = %key, job_id = %job_id, "menu job running");
            tokio::spawn(worker.run_logged());
        }
        entry
    }

    /// Pure read of the stored entry.
    pub fn get_prefetched(&self, key: &str) -> Option<PrefetchEntry> {
        self.lock().store.get(key).cloned()
    }

    pub fn is_ready(&self, key: &str) -> bool {
        self.lock()
            .store
            .get(key)
            .is_some_and(PrefetchEntry::is_ready)
    }

    /// `Idle` for unknown keys.
    pub fn status(&self, key: &str) -> PrefetchStatus {
        self.lock()
            .store
            .get(key)
            .map(|e| e.status)
            .unwrap_or_default()
    }

    /// Disown the key's worker (if any) and forget its entry. Returns whether an entry existed.
    pub fn clear_cache(&self, key: &str) -> bool {
        let mut state = self.lock();
        state.disown(key);
        state.attempts.remove(key);
        state.store.delete(key).is_some()
    }

    pub fn active_key(&self) -> Option<String> {
        self.lock().active_key.clone()
    }

    /// All entries, sorted by key.
    pub fn snapshot(&self) -> Vec<PrefetchEntry> {
        let state = self.lock();
        let mut out: Vec<PrefetchEntry> = state.store.values().cloned().collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// Disown every live worker. Entries stay as they are.
    pub fn cancel_all(&self) {
        let mut state = self.lock();
        let keys: Vec<String> = state.live.keys().cloned().collect();
        for key in keys {
            state.disown(&key);
        }
    }
}

impl Drop for PrefetchCoordinator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
