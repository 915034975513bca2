//! Reconciliation coordinator for the job board.
//!
//! [`JobBoard`] turns fire-and-forget triggers into a coherent, observable
//! sequence of states. A trigger resolves, its flag clears, a reload of the
//! authoritative server collection is scheduled as a separate non-blocking
//! task: immediately when the endpoint ingests synchronously, after a fixed
//! delay when the server only enqueues the work. Loads are fail-soft: a
//! failed refresh surfaces an error and leaves the previous list visible.
//!
//! Known limitations, deliberate: overlapping loads race and the last
//! response wins; pending reloads are not deduplicated across triggers; no
//! timeout is imposed beyond the platform default, so a hung request leaves
//! its flag set.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::client::{ApiClient, FetchParams};
use crate::types::{Job, Preference};

/// How many jobs a board reload asks the server for.
pub const DEFAULT_JOB_LIMIT: u32 = 20;

/// How long a fetch trigger waits before reconciling, matching the queue
/// drain time of the fetcher pipeline.
pub const DEFAULT_FETCH_RELOAD_DELAY: Duration = Duration::from_secs(3);

/// When a trigger's follow-up reload runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStrategy {
    /// The endpoint ingests synchronously; reload right away.
    Immediate,
    /// The endpoint only enqueues work; wait out the ingestion window first.
    Delayed(Duration),
}

/// Everything the presentation layer reads. Rebuilt per operation, never
/// partially stale: each state-changing operation clears `error` and
/// `message` before it starts.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub jobs: Vec<Job>,
    pub preferences: Vec<Preference>,
    pub loading: bool,
    pub fetching: bool,
    pub scanning: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Drives loads, triggers, and preference mutations against a shared
/// [`BoardState`] snapshot.
pub struct JobBoard {
    api: ApiClient,
    state: Arc<Mutex<BoardState>>,
    job_limit: u32,
    fetch_reload: ReloadStrategy,
    scan_reload: ReloadStrategy,
    pending_reloads: Mutex<Vec<JoinHandle<()>>>,
}

impl JobBoard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(BoardState::default())),
            job_limit: DEFAULT_JOB_LIMIT,
            fetch_reload: ReloadStrategy::Delayed(DEFAULT_FETCH_RELOAD_DELAY),
            scan_reload: ReloadStrategy::Immediate,
            pending_reloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_job_limit(mut self, limit: u32) -> Self {
        self.job_limit = limit;
        self
    }

    pub fn with_fetch_reload(mut self, strategy: ReloadStrategy) -> Self {
        self.fetch_reload = strategy;
        self
    }

    pub fn with_scan_reload(mut self, strategy: ReloadStrategy) -> Self {
        self.scan_reload = strategy;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BoardState {
        self.state.lock().unwrap().clone()
    }

    /// Refresh the job list from the server. On failure the previous list
    /// stays visible and only `error` changes.
    pub async fn load_jobs(&self) {
        run_load_jobs(self.api.clone(), Arc::clone(&self.state), self.job_limit).await;
    }

    /// Refresh the preference list. Same fail-soft contract as
    /// [`JobBoard::load_jobs`].
    pub async fn load_preferences(&self) {
        self.state.lock().unwrap().error = None;
        let result = self.api.preferences().await;
        let mut state = self.state.lock().unwrap();
        match result {
            Ok(preferences) => state.preferences = preferences,
            Err(e) => state.error = Some(e.to_string()),
        }
    }

    /// Trigger the fetcher pipeline, then reconcile. `fetching` clears as
    /// soon as the trigger call resolves; the reload runs on its own.
    pub async fn trigger_fetch(&self, params: FetchParams) {
        {
            let mut state = self.state.lock().unwrap();
            state.fetching = true;
            state.error = None;
            state.message = None;
        }
        let result = self.api.fetch_jobs(params).await;
        let scheduled = {
            let mut state = self.state.lock().unwrap();
            state.fetching = false;
            match result {
                Ok(response) => {
                    state.message = Some(response.message);
                    true
                }
                Err(e) => {
                    state.error = Some(e.to_string());
                    false
                }
            }
        };
        if scheduled {
            self.schedule_reload(self.fetch_reload);
        }
    }

    /// Trigger a synchronous scan-and-ingest pass, then reconcile.
    pub async fn trigger_scan(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.scanning = true;
            state.error = None;
            state.message = None;
        }
        let result = self.api.scan_jobs().await;
        let scheduled = {
            let mut state = self.state.lock().unwrap();
            state.scanning = false;
            match result {
                Ok(response) => {
                    state.message = Some(response.message);
                    true
                }
                Err(e) => {
                    state.error = Some(e.to_string());
                    false
                }
            }
        };
        if scheduled {
            self.schedule_reload(self.scan_reload);
        }
    }

    /// Create a preference and prepend it to the local view, without a reload.
    /// The server-assigned row is what a reload would show first anyway.
    pub async fn add_preference(&self, key: &str, value: &str) {
        {
            let mut state = self.state.lock().unwrap();
            state.error = None;
            state.message = None;
        }
        let result = self.api.create_preference(key, value).await;
        let mut state = self.state.lock().unwrap();
        match result {
            Ok(preference) => state.preferences.insert(0, preference),
            Err(e) => state.error = Some(e.to_string()),
        }
    }

    /// Update a preference's value in place.
    pub async fn change_preference(&self, id: Uuid, value: &str) {
        {
            let mut state = self.state.lock().unwrap();
            state.error = None;
            state.message = None;
        }
        let result = self.api.update_preference(id, value).await;
        let mut state = self.state.lock().unwrap();
        match result {
            Ok(updated) => {
                if let Some(slot) = state.preferences.iter_mut().find(|p| p.id == id) {
                    *slot = updated;
                }
            }
            Err(e) => state.error = Some(e.to_string()),
        }
    }

    /// Delete a preference and drop it from the local view, without a reload.
    /// A 404 also drops the row: the end state (row absent) matches intent,
    /// so an already-deleted row is not an error worth surfacing. Any other
    /// failure leaves the list untouched.
    pub async fn remove_preference(&self, id: Uuid) {
        {
            let mut state = self.state.lock().unwrap();
            state.error = None;
            state.message = None;
        }
        let result = self.api.delete_preference(id).await;
        let mut state = self.state.lock().unwrap();
        match result {
            Ok(()) => state.preferences.retain(|p| p.id != id),
            Err(e) if e.is_not_found() => state.preferences.retain(|p| p.id != id),
            Err(e) => state.error = Some(e.to_string()),
        }
    }

    /// Abort every reload that hasn't run yet. Lets a teardown path suppress
    /// stale reconciliations.
    pub fn cancel_pending_reloads(&self) {
        for handle in self.pending_reloads.lock().unwrap().drain(..) {
            handle.abort();
        }
    }

    /// Wait for every scheduled reload to finish. Used by one-shot consumers
    /// that want the post-reconciliation state before reading it.
    pub async fn drain_pending_reloads(&self) {
        let handles: Vec<_> = self.pending_reloads.lock().unwrap().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    fn schedule_reload(&self, strategy: ReloadStrategy) {
        let api = self.api.clone();
        let state = Arc::clone(&self.state);
        let limit = self.job_limit;
        debug!(?strategy, "scheduling job reload");
        let handle = tokio::spawn(async move {
            if let ReloadStrategy::Delayed(wait) = strategy {
                tokio::time::sleep(wait).await;
            }
            run_load_jobs(api, state, limit).await;
        });
        self.pending_reloads.lock().unwrap().push(handle);
    }
}

/// The load flow shared by direct loads and scheduled reloads. The lock is
/// never held across an await.
async fn run_load_jobs(api: ApiClient, state: Arc<Mutex<BoardState>>, limit: u32) {
    {
        let mut state = state.lock().unwrap();
        state.loading = true;
        state.error = None;
    }
    let result = api.jobs(Some(limit)).await;
    let mut state = state.lock().unwrap();
    match result {
        Ok(jobs) => state.jobs = jobs,
        Err(e) => state.error = Some(e.to_string()),
    }
    state.loading = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::{MemoryCredentialStore, SessionStore};
    use httpmock::MockServer;
    use serde_json::json;

    const PREF_A: &str = "7f1c1a2e-0000-4000-8000-0000000000a1";
    const PREF_B: &str = "7f1c1a2e-0000-4000-8000-0000000000b2";

    fn board_for(server: &MockServer) -> JobBoard {
        let session = SessionStore::new(Arc::new(MemoryCredentialStore::new()));
        let api = ApiClient::new(ClientConfig::new(server.base_url()), Arc::new(session));
        JobBoard::new(api)
    }

    fn job_json(id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": format!("7f1c1a2e-0000-4000-8000-0000000000{id}"),
            "title": title,
            "company": "Acme",
            "location": "Remote",
            "job_url": "https://jobs.example.com"
        })
    }

    fn prefs_body() -> serde_json::Value {
        json!({"preferences": [
            {"id": PREF_A, "key": "stack", "value": "rust"},
            {"id": PREF_B, "key": "remote", "value": "yes"}
        ]})
    }

    #[tokio::test]
    async fn scan_sets_message_clears_flag_and_reconciles() {
        let server = MockServer::start_async().await;
        let _scan = server
            .mock_async(|when, then| {
                when.method("POST").path("/api/jobs/scan");
                then.status(200)
                    .json_body(json!({"message": "ok", "fetched": 5, "stored": 3}));
            })
            .await;
        let jobs = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(200)
                    .json_body(json!({"jobs": [job_json("01", "Backend Engineer")]}));
            })
            .await;

        let board = board_for(&server);
        board.trigger_scan().await;

        let state = board.state();
        assert_eq!(state.message.as_deref(), Some("ok"));
        assert!(!state.scanning);
        assert!(state.error.is_none());

        board.drain_pending_reloads().await;
        let state = board.state();
        assert_eq!(state.jobs.len(), 1);
        assert_eq!(state.jobs[0].title, "Backend Engineer");
        jobs.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_reload_waits_out_the_ingestion_window() {
        let server = MockServer::start_async().await;
        let _fetch = server
            .mock_async(|when, then| {
                when.method("POST").path("/api/jobs/fetch");
                then.status(200).json_body(
                    json!({"message": "queued", "jobs_found": 2, "jobs_queued": 2}),
                );
            })
            .await;
        let jobs = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(200)
                    .json_body(json!({"jobs": [job_json("02", "Rust Engineer")]}));
            })
            .await;

        let board =
            board_for(&server).with_fetch_reload(ReloadStrategy::Delayed(Duration::from_millis(200)));
        board.trigger_fetch(FetchParams::default()).await;

        // The trigger has resolved: flag down, message up, reload not yet run.
        let state = board.state();
        assert!(!state.fetching);
        assert_eq!(state.message.as_deref(), Some("queued"));
        assert_eq!(jobs.hits_async().await, 0);

        board.drain_pending_reloads().await;
        assert_eq!(board.state().jobs.len(), 1);
        assert_eq!(jobs.hits_async().await, 1);
    }

    #[tokio::test]
    async fn failed_trigger_sets_error_and_schedules_nothing() {
        let server = MockServer::start_async().await;
        let _fetch = server
            .mock_async(|when, then| {
                when.method("POST").path("/api/jobs/fetch");
                then.status(502)
                    .json_body(json!({"message": "failed to reach job fetcher service"}));
            })
            .await;
        let jobs = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(200).json_body(json!({"jobs": []}));
            })
            .await;

        let board = board_for(&server);
        board.trigger_fetch(FetchParams::default()).await;
        board.drain_pending_reloads().await;

        let state = board.state();
        assert!(!state.fetching);
        assert_eq!(
            state.error.as_deref(),
            Some("failed to reach job fetcher service")
        );
        assert!(state.message.is_none());
        assert_eq!(jobs.hits_async().await, 0);
    }

    #[tokio::test]
    async fn failed_load_preserves_stale_jobs() {
        let server = MockServer::start_async().await;
        let good = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(200).json_body(
                    json!({"jobs": [job_json("0a", "Job A"), job_json("0b", "Job B")]}),
                );
            })
            .await;

        let board = board_for(&server);
        board.load_jobs().await;
        assert_eq!(board.state().jobs.len(), 2);

        good.delete_async().await;
        let _bad = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(500).json_body(json!({"message": "db down"}));
            })
            .await;

        board.load_jobs().await;
        let state = board.state();
        assert_eq!(state.error.as_deref(), Some("db down"));
        assert_eq!(state.jobs.len(), 2);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn delete_removes_row_without_a_reload() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/preferences");
                then.status(200).json_body(prefs_body());
            })
            .await;
        let _delete = server
            .mock_async(|when, then| {
                when.method("DELETE").path(format!("/api/preferences/{PREF_A}"));
                then.status(204);
            })
            .await;

        let board = board_for(&server);
        board.load_preferences().await;
        assert_eq!(board.state().preferences.len(), 2);

        board.remove_preference(PREF_A.parse().unwrap()).await;
        let state = board.state();
        assert_eq!(state.preferences.len(), 1);
        assert_eq!(state.preferences[0].key, "remote");
        assert!(state.error.is_none());
        // Still exactly one list call: the mutation did not trigger a reload.
        assert_eq!(list.hits_async().await, 1);
    }

    #[tokio::test]
    async fn delete_of_missing_row_still_clears_it_locally() {
        let server = MockServer::start_async().await;
        let _list = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/preferences");
                then.status(200).json_body(prefs_body());
            })
            .await;
        let _delete = server
            .mock_async(|when, then| {
                when.method("DELETE").path(format!("/api/preferences/{PREF_A}"));
                then.status(404)
                    .json_body(json!({"message": "preference not found"}));
            })
            .await;

        let board = board_for(&server);
        board.load_preferences().await;
        board.remove_preference(PREF_A.parse().unwrap()).await;

        let state = board.state();
        assert_eq!(state.preferences.len(), 1);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn failed_delete_leaves_list_untouched() {
        let server = MockServer::start_async().await;
        let _list = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/preferences");
                then.status(200).json_body(prefs_body());
            })
            .await;
        let _delete = server
            .mock_async(|when, then| {
                when.method("DELETE").path(format!("/api/preferences/{PREF_A}"));
                then.status(500).json_body(json!({"message": "internal server error"}));
            })
            .await;

        let board = board_for(&server);
        board.load_preferences().await;
        board.remove_preference(PREF_A.parse().unwrap()).await;

        let state = board.state();
        assert_eq!(state.preferences.len(), 2);
        assert_eq!(state.error.as_deref(), Some("internal server error"));
    }

    #[tokio::test]
    async fn created_preference_is_prepended() {
        let server = MockServer::start_async().await;
        let _list = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/preferences");
                then.status(200).json_body(prefs_body());
            })
            .await;
        let _create = server
            .mock_async(|when, then| {
                when.method("POST").path("/api/preferences");
                then.status(201).json_body(
                    json!({"id": "7f1c1a2e-0000-4000-8000-0000000000c3", "key": "salary", "value": "150k"}),
                );
            })
            .await;

        let board = board_for(&server);
        board.load_preferences().await;
        board.add_preference("salary", "150k").await;

        let state = board.state();
        assert_eq!(state.preferences.len(), 3);
        assert_eq!(state.preferences[0].key, "salary");
    }

    #[tokio::test]
    async fn next_operation_clears_previous_error_and_message() {
        let server = MockServer::start_async().await;
        let bad = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(500).json_body(json!({"message": "db down"}));
            })
            .await;

        let board = board_for(&server);
        board.load_jobs().await;
        assert!(board.state().error.is_some());

        bad.delete_async().await;
        let _good = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(200).json_body(json!({"jobs": []}));
            })
            .await;

        board.load_jobs().await;
        assert!(board.state().error.is_none());
    }

    #[tokio::test]
    async fn cancelled_reload_never_fires() {
        let server = MockServer::start_async().await;
        let _fetch = server
            .mock_async(|when, then| {
                when.method("POST").path("/api/jobs/fetch");
                then.status(200)
                    .json_body(json!({"message": "queued", "jobs_found": 1, "jobs_queued": 1}));
            })
            .await;
        let jobs = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/jobs");
                then.status(200).json_body(json!({"jobs": []}));
            })
            .await;

        let board = board_for(&server)
            .with_fetch_reload(ReloadStrategy::Delayed(Duration::from_millis(100)));
        board.trigger_fetch(FetchParams::default()).await;
        board.cancel_pending_reloads();

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(jobs.hits_async().await, 0);
    }
}
