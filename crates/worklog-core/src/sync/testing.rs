//! Scriptable in-memory API used by sync tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use super::api::{RemoteReceipt, RemoteRequest, SyncError, SyncResult, WorkLogApi};

#[derive(Default)]
struct State {
    calls: Vec<(RemoteRequest, Instant)>,
    /// Remaining failures keyed by description (create/update) or id (delete)
    failures: HashMap<String, usize>,
    created: usize,
}

/// Records every request; fails on demand
#[derive(Clone, Default)]
pub struct RecordingApi {
    state: Arc<Mutex<State>>,
    latency: Option<Duration>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next `times` requests matching `key`
    pub fn fail(&self, key: &str, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(key.to_string(), times);
    }

    /// Fail every request matching `key`
    pub fn fail_always(&self, key: &str) {
        self.fail(key, usize::MAX);
    }

    pub fn calls(&self) -> Vec<RemoteRequest> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, instant)| *instant)
            .collect()
    }

    /// Descriptions (or delete ids) in call order
    pub fn call_keys(&self) -> Vec<String> {
        self.calls().iter().map(request_key).collect()
    }
}

fn request_key(request: &RemoteRequest) -> String {
    match request {
        RemoteRequest::Create { payload } | RemoteRequest::Update { payload, .. } => {
            payload.description.clone()
        }
        RemoteRequest::Delete { id } => id.clone(),
    }
}

impl WorkLogApi for RecordingApi {
    async fn send(&self, request: &RemoteRequest) -> SyncResult<RemoteReceipt> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push((request.clone(), Instant::now()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(remaining) = state.failures.get_mut(&request_key(request)) {
            if *remaining > 0 {
                *remaining = remaining.saturating_sub(1);
                return Err(SyncError::ServerError {
                    status: 503,
                    message: "unavailable (503)".to_string(),
                });
            }
        }

        if matches!(request, RemoteRequest::Create { .. }) {
            state.created += 1;
            return Ok(RemoteReceipt {
                server_id: Some(format!("srv-{}", state.created)),
                server_version: Some(1),
            });
        }
        Ok(RemoteReceipt::default())
    }
}
