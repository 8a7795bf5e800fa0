//! Explicitly constructed sync context: store, network flag, queue and trigger.

use std::path::PathBuf;

use crate::actions::OfflineActions;
use crate::config::RetryPolicy;
use crate::db::{Store, StoreLocation};
use crate::error::Result;
use crate::models::SyncQueueItem;
use crate::network::NetworkMonitor;
use crate::queue::MutationQueue;
use crate::state::SyncSummary;
use crate::sync::{
    SuccessCallback, SyncOutcome, SyncProcessor, SyncReport, SyncTrigger, WakeUpScheduler,
    WorkLogApi,
};

/// Knobs for [`WorkLogService::open`]
#[derive(Default)]
pub struct ServiceOptions {
    retry: RetryPolicy,
    platform_online: Option<bool>,
    scheduler: Option<Box<dyn WakeUpScheduler>>,
    on_success: Option<SuccessCallback>,
}

impl ServiceOptions {
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Initial connectivity as reported by the platform; `None` means online
    #[must_use]
    pub fn with_platform_online(mut self, online: Option<bool>) -> Self {
        self.platform_online = online;
        self
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: impl WakeUpScheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    #[must_use]
    pub fn with_success_callback(
        mut self,
        callback: impl Fn(&SyncReport) + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }
}

/// One independent offline sync context.
///
/// Instances share nothing; two services over two in-memory stores never see
/// each other's records.
pub struct WorkLogService<A> {
    store: Store,
    queue: MutationQueue,
    trigger: SyncTrigger<A>,
}

impl<A: WorkLogApi> WorkLogService<A> {
    /// Open (and migrate) the store at `location` and wire the engine around it
    pub async fn open(location: StoreLocation, api: A, options: ServiceOptions) -> Result<Self> {
        let store = Store::new(location);
        store.open().await?;

        let processor = SyncProcessor::new(store.clone(), api, options.retry);
        let network = NetworkMonitor::new(options.platform_online);
        let trigger = SyncTrigger::new(processor, network)
            .with_scheduler(options.scheduler)
            .with_success_callback(options.on_success);

        Ok(Self {
            queue: MutationQueue::new(store.clone()),
            store,
            trigger,
        })
    }

    /// Open a file-backed service, creating parent directories as needed
    pub async fn open_path(
        path: impl Into<PathBuf>,
        api: A,
        options: ServiceOptions,
    ) -> Result<Self> {
        Self::open(StoreLocation::Path(path.into()), api, options).await
    }

    /// Open an in-memory service (primarily for tests)
    pub async fn open_in_memory(api: A, options: ServiceOptions) -> Result<Self> {
        Self::open(StoreLocation::Memory, api, options).await
    }

    /// Release the store; every later call on any handle fails with `StorageUnavailable`
    pub async fn close(&self) {
        self.store.close().await;
        tracing::debug!("Work log service closed");
    }

    pub const fn actions(&self) -> OfflineActions<'_, A> {
        OfflineActions::new(&self.store, &self.trigger)
    }

    pub const fn network(&self) -> &NetworkMonitor {
        self.trigger.network()
    }

    pub const fn queue(&self) -> &MutationQueue {
        &self.queue
    }

    pub const fn store(&self) -> &Store {
        &self.store
    }

    pub const fn trigger(&self) -> &SyncTrigger<A> {
        &self.trigger
    }

    /// Manual "sync now"
    pub async fn sync_now(&self) -> Result<SyncOutcome> {
        self.trigger.sync_now().await
    }

    /// Pending queue items in drain order
    pub async fn pending_items(&self) -> Result<Vec<SyncQueueItem>> {
        self.queue.drain_ordered().await
    }

    /// Indicator data for `user_id`
    pub async fn status(&self, user_id: &str) -> Result<SyncSummary> {
        let items = self.pending_items().await?;
        let policy = self.trigger.processor().policy();
        let failed = items
            .iter()
            .filter(|item| !policy.allows_retry(item.retry_count))
            .count();

        Ok(SyncSummary {
            online: self.network().is_online(),
            pending: items.len(),
            failed,
            active: self.actions().active_for(user_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{StartRequest, StopRequest};
    use crate::error::Error;
    use crate::network::NetworkEvent;
    use crate::state::SyncState;
    use crate::sync::testing::RecordingApi;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn offline_options() -> ServiceOptions {
        ServiceOptions::default()
            .with_platform_online(Some(false))
            .with_retry(RetryPolicy::new(2, Duration::from_millis(1)))
    }

    fn start_request(description: &str) -> StartRequest {
        StartRequest {
            user_id: "user-1".to_string(),
            description: description.to_string(),
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn instances_share_nothing() {
        let first = WorkLogService::open_in_memory(RecordingApi::new(), offline_options())
            .await
            .unwrap();
        let second = WorkLogService::open_in_memory(RecordingApi::new(), offline_options())
            .await
            .unwrap();

        first.actions().start(start_request("only here")).await.unwrap();
        first.network().handle_event(NetworkEvent::Online);

        assert_eq!(first.queue().len().await.unwrap(), 1);
        assert_eq!(second.queue().len().await.unwrap(), 0);
        assert!(!second.network().is_online());
    }

    #[tokio::test]
    async fn close_makes_the_service_unavailable() {
        let service = WorkLogService::open_in_memory(RecordingApi::new(), offline_options())
            .await
            .unwrap();
        service.close().await;

        let error = service.pending_items().await.unwrap_err();
        assert!(matches!(error, Error::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn status_reports_pending_failed_and_active() {
        let api = RecordingApi::new();
        let service = WorkLogService::open_in_memory(api.clone(), offline_options())
            .await
            .unwrap();

        let started = service.actions().start(start_request("failing")).await.unwrap();
        let summary = service.status("user-1").await.unwrap();
        assert_eq!(summary.state(), SyncState::Offline);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.active.map(|log| log.id), Some(started.active.id));

        api.fail_always("failing");
        service.network().handle_event(NetworkEvent::Online);
        service.sync_now().await.unwrap();

        let summary = service.status("user-1").await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.state(), SyncState::Error);
        assert_eq!(summary.pending_label().as_deref(), Some("1 change pending"));
    }

    #[tokio::test]
    async fn queue_survives_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("worklog.db");

        {
            let service = WorkLogService::open_path(&path, RecordingApi::new(), offline_options())
                .await
                .unwrap();
            let started = service.actions().start(start_request("durable")).await.unwrap();
            service
                .actions()
                .stop(StopRequest {
                    current: Some(started.active),
                    ..StopRequest::default()
                })
                .await
                .unwrap();
            service.close().await;
        }

        let api = RecordingApi::new();
        let synced = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&synced);
        let options = ServiceOptions::default().with_success_callback(move |report| {
            counter.fetch_add(report.succeeded, Ordering::SeqCst);
        });
        let service = WorkLogService::open_path(&path, api.clone(), options)
            .await
            .unwrap();

        assert_eq!(service.pending_items().await.unwrap().len(), 2);
        service.sync_now().await.unwrap();
        assert_eq!(api.call_keys(), vec!["durable", "durable"]);
        assert_eq!(synced.load(Ordering::SeqCst), 2);
        assert!(service.queue().is_empty().await.unwrap());
    }
}
