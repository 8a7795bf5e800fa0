//! Offline start / stop / switch.
//!
//! Each action writes its replica change and the matching queue item in one
//! storage transaction, then asks the trigger for a sync. Remote failures
//! never surface here; they stay in the queue.

use crate::db::{Index, Store, WriteBatch};
use crate::error::{Error, Result};
use crate::models::{Operation, SyncQueueItem, SyncStatus, WorkLog};
use crate::queue::MutationQueue;
use crate::sync::{SyncOutcome, SyncTrigger, WorkLogApi};
use crate::util::{normalize_tags, unix_millis_now};

/// Open a new work session
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub user_id: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Close the caller's active session
#[derive(Debug, Clone, Default)]
pub struct StopRequest {
    pub current: Option<WorkLog>,
    /// Replaces the description when set
    pub description: Option<String>,
    /// Replaces the tags when set
    pub tags: Option<Vec<String>>,
}

/// Close the active session and open the next one at the same instant
#[derive(Debug, Clone, Default)]
pub struct SwitchRequest {
    pub current: Option<WorkLog>,
    pub user_id: String,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub active: WorkLog,
    /// `None` when the sync request itself failed locally
    pub sync: Option<SyncOutcome>,
}

#[derive(Debug, Clone)]
pub struct StopOutcome {
    pub closed: WorkLog,
    pub duration_secs: i64,
    pub sync: Option<SyncOutcome>,
}

#[derive(Debug, Clone)]
pub struct SwitchOutcome {
    pub closed: WorkLog,
    pub active: WorkLog,
    /// Duration of the closed session
    pub duration_secs: i64,
    pub sync: Option<SyncOutcome>,
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub deleted: WorkLog,
    pub sync: Option<SyncOutcome>,
}

/// Action layer over a store and the trigger that syncs it
pub struct OfflineActions<'a, A> {
    store: &'a Store,
    trigger: &'a SyncTrigger<A>,
}

impl<'a, A: WorkLogApi> OfflineActions<'a, A> {
    pub const fn new(store: &'a Store, trigger: &'a SyncTrigger<A>) -> Self {
        Self { store, trigger }
    }

    pub async fn start(&self, request: StartRequest) -> Result<StartOutcome> {
        self.start_at(request, unix_millis_now()).await
    }

    /// Start a session at `now` (Unix ms)
    pub async fn start_at(&self, request: StartRequest, now: i64) -> Result<StartOutcome> {
        let user_id = request.user_id.trim();
        if user_id.is_empty() {
            return Err(Error::InvalidInput("User id is required".to_string()));
        }

        let active = WorkLog::start(
            user_id,
            request.description.trim(),
            normalize_tags(&request.tags),
            now,
        );
        self.write(&[&active], now)
            .await
            .map_err(|e| e.into_action_failure("start"))?;
        tracing::info!("Started work log {}", active.id);

        let sync = self.request_sync().await;
        Ok(StartOutcome { active, sync })
    }

    pub async fn stop(&self, request: StopRequest) -> Result<StopOutcome> {
        self.stop_at(request, unix_millis_now()).await
    }

    /// Stop the active session at `now`; an end before the start is clamped to the start
    pub async fn stop_at(&self, request: StopRequest, now: i64) -> Result<StopOutcome> {
        let mut closed = take_active(request.current)?;
        let description = request
            .description
            .map_or_else(|| closed.description.clone(), |text| text.trim().to_string());
        let tags = request
            .tags
            .map_or_else(|| closed.tags.clone(), normalize_tags);
        closed.close(now.max(closed.start_at), description, tags);

        self.write(&[&closed], now)
            .await
            .map_err(|e| e.into_action_failure("stop"))?;
        let duration_secs = closed.duration_secs().unwrap_or_default();
        tracing::info!("Stopped work log {} after {}s", closed.id, duration_secs);

        let sync = self.request_sync().await;
        Ok(StopOutcome {
            closed,
            duration_secs,
            sync,
        })
    }

    pub async fn switch(&self, request: SwitchRequest) -> Result<SwitchOutcome> {
        self.switch_at(request, unix_millis_now()).await
    }

    /// Close the active session at `now` with its own description and tags,
    /// then open a new one starting at the same instant
    pub async fn switch_at(&self, request: SwitchRequest, now: i64) -> Result<SwitchOutcome> {
        let user_id = request.user_id.trim();
        if user_id.is_empty() {
            return Err(Error::InvalidInput("User id is required".to_string()));
        }

        let mut closed = take_active(request.current)?;
        let boundary = now.max(closed.start_at);
        let (description, tags) = (closed.description.clone(), closed.tags.clone());
        closed.close(boundary, description, tags);

        let active = WorkLog::start(
            user_id,
            request.description.trim(),
            normalize_tags(&request.tags),
            boundary,
        );

        self.write(&[&closed, &active], now)
            .await
            .map_err(|e| e.into_action_failure("switch"))?;
        let duration_secs = closed.duration_secs().unwrap_or_default();
        tracing::info!(
            "Switched from work log {} ({}s) to {}",
            closed.id,
            duration_secs,
            active.id
        );

        let sync = self.request_sync().await;
        Ok(SwitchOutcome {
            closed,
            active,
            duration_secs,
            sync,
        })
    }

    /// Mark a replica deleted and queue the remote delete
    pub async fn delete_at(&self, replica: WorkLog, now: i64) -> Result<DeleteOutcome> {
        let mut deleted = replica;
        deleted.operation = Operation::Delete;
        deleted.sync_status = SyncStatus::Pending;
        deleted.error = None;

        self.write(&[&deleted], now)
            .await
            .map_err(|e| e.into_action_failure("delete"))?;
        tracing::info!("Deleted work log {}", deleted.id);

        let sync = self.request_sync().await;
        Ok(DeleteOutcome { deleted, sync })
    }

    /// Remove finished replicas the server has confirmed; returns how many went
    pub async fn purge_synced(&self) -> Result<usize> {
        let synced = self
            .store
            .get_all_by_index::<WorkLog>(Index::SyncStatus, SyncStatus::Synced)
            .await
            .map_err(|e| e.into_action_failure("purge"))?;

        let mut batch = WriteBatch::new();
        for replica in synced.iter().filter(|replica| !replica.is_active()) {
            batch.delete::<WorkLog>(&replica.id.as_str());
        }

        let purged = batch.len();
        self.store
            .commit(batch)
            .await
            .map_err(|e| e.into_action_failure("purge"))?;
        if purged > 0 {
            tracing::info!("Purged {} synced work logs", purged);
        }
        Ok(purged)
    }

    /// The user's in-progress session, latest start first
    pub async fn active_for(&self, user_id: &str) -> Result<Option<WorkLog>> {
        let replicas = self
            .store
            .get_all_by_index::<WorkLog>(Index::UserId, user_id)
            .await?;

        Ok(replicas
            .into_iter()
            .filter(|replica| replica.is_active() && replica.operation != Operation::Delete)
            .max_by_key(|replica| replica.start_at))
    }

    /// Replicas and their queue items, committed together
    async fn write(&self, replicas: &[&WorkLog], now: i64) -> Result<()> {
        let queued_at = self.enqueue_timestamp(now).await?;
        let mut batch = WriteBatch::new();
        for replica in replicas {
            batch.put(*replica)?;
        }
        for replica in replicas {
            batch.put(&SyncQueueItem::for_replica(replica, queued_at))?;
        }
        self.store.commit(batch).await
    }

    /// `now`, raised to the newest queued timestamp when the clock has
    /// stepped back, so drain order stays enqueue order
    async fn enqueue_timestamp(&self, now: i64) -> Result<i64> {
        let queued = MutationQueue::new(self.store.clone()).drain_ordered().await?;
        Ok(queued
            .last()
            .map_or(now, |latest| latest.timestamp.max(now)))
    }

    async fn request_sync(&self) -> Option<SyncOutcome> {
        match self.trigger.request_sync().await {
            Ok(outcome) => Some(outcome),
            Err(error) => {
                tracing::warn!("Sync after local change failed: {}", error);
                None
            }
        }
    }
}

fn take_active(current: Option<WorkLog>) -> Result<WorkLog> {
    match current {
        Some(replica) if replica.is_active() => Ok(replica),
        _ => Err(Error::NoActiveWork),
    }
}
