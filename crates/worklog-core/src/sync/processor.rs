//! Queue drain pass with bounded per-item retry.

use crate::config::RetryPolicy;
use crate::db::Store;
use crate::error::Result;
use crate::models::{Mutation, QueueItemPatch, SyncQueueItem, SyncStatus, WorkLog};
use crate::queue::MutationQueue;

use super::api::{RemoteReceipt, RemoteRequest, WorkLogApi};

/// Counters for one or more drain passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Items taken from the snapshot
    pub processed: usize,
    /// Items confirmed remotely and removed from the queue
    pub succeeded: usize,
    /// Items left queued after exhausting their retries
    pub abandoned: usize,
    /// Remote calls issued
    pub attempts: usize,
}

impl SyncReport {
    /// At least one item was removed; callers refresh server views on this
    pub const fn has_success(&self) -> bool {
        self.succeeded > 0
    }

    pub(crate) fn absorb(&mut self, other: Self) {
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.abandoned += other.abandoned;
        self.attempts += other.attempts;
    }
}

enum ItemOutcome {
    Synced(RemoteReceipt),
    Abandoned(String),
}

/// Drains the mutation queue against a [`WorkLogApi`], one item at a time
pub struct SyncProcessor<A> {
    store: Store,
    queue: MutationQueue,
    api: A,
    policy: RetryPolicy,
}

impl<A: WorkLogApi> SyncProcessor<A> {
    pub fn new(store: Store, api: A, policy: RetryPolicy) -> Self {
        Self {
            queue: MutationQueue::new(store.clone()),
            store,
            api,
            policy,
        }
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    /// One pass over a snapshot of the queue taken at the start.
    ///
    /// Items are sent strictly in snapshot order. A failing item is retried
    /// in place with backoff until its budget runs out, then left queued
    /// while the pass moves on. Storage failures abort the pass.
    pub async fn drain_and_sync(&self) -> Result<SyncReport> {
        let snapshot = self.queue.drain_ordered().await?;
        let mut report = SyncReport::default();

        if snapshot.is_empty() {
            tracing::debug!("Sync queue is empty");
            return Ok(report);
        }

        for (position, item) in snapshot.iter().enumerate() {
            report.processed += 1;
            let more_for_replica = snapshot[position + 1..]
                .iter()
                .any(|later| later.work_log_id == item.work_log_id);

            match self.process_item(item.clone(), &mut report).await? {
                ItemOutcome::Synced(receipt) => {
                    report.succeeded += 1;
                    self.record_success(item, &receipt, more_for_replica).await;
                }
                ItemOutcome::Abandoned(message) => {
                    report.abandoned += 1;
                    self.record_failure(item, &message).await;
                }
            }
        }

        tracing::info!(
            "Sync pass finished: {} processed, {} synced, {} left pending",
            report.processed,
            report.succeeded,
            report.abandoned
        );
        Ok(report)
    }

    async fn process_item(
        &self,
        mut item: SyncQueueItem,
        report: &mut SyncReport,
    ) -> Result<ItemOutcome> {
        let request = self.build_request(&item).await?;

        loop {
            report.attempts += 1;
            tracing::debug!(
                "{} {} for queue item {} (attempt {})",
                request.method(),
                request.path(),
                item.id,
                item.retry_count + 1
            );

            match self.api.send(&request).await {
                Ok(receipt) => {
                    self.queue.remove(&item.id).await?;
                    return Ok(ItemOutcome::Synced(receipt));
                }
                Err(error) => {
                    item.retry_count = item.retry_count.saturating_add(1);
                    let message = error.to_string();
                    self.queue
                        .patch(
                            &item.id,
                            QueueItemPatch::failure(item.retry_count, message.clone()),
                        )
                        .await?;

                    if !self.policy.allows_retry(item.retry_count) {
                        tracing::warn!(
                            "Giving up on queue item {} after {} attempts: {}",
                            item.id,
                            item.retry_count,
                            message
                        );
                        return Ok(ItemOutcome::Abandoned(message));
                    }

                    let delay = self.policy.delay_for(item.retry_count);
                    tracing::warn!(
                        "Sync of queue item {} failed ({}); retry {} in {:?}",
                        item.id,
                        message,
                        item.retry_count,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn build_request(&self, item: &SyncQueueItem) -> Result<RemoteRequest> {
        let request = match &item.mutation {
            Mutation::Create(snapshot) => RemoteRequest::Create {
                payload: snapshot.into(),
            },
            Mutation::Update(snapshot) => RemoteRequest::Update {
                id: self.remote_id(snapshot).await?,
                payload: snapshot.into(),
            },
            Mutation::Delete(snapshot) => RemoteRequest::Delete {
                id: self.remote_id(snapshot).await?,
            },
        };
        Ok(request)
    }

    /// Snapshot's server id, else the one recorded since the create synced, else the local id
    async fn remote_id(&self, snapshot: &WorkLog) -> Result<String> {
        if let Some(server_id) = &snapshot.server_id {
            return Ok(server_id.clone());
        }

        let recorded = self
            .store
            .get::<WorkLog>(&snapshot.id.as_str())
            .await?
            .and_then(|replica| replica.server_id);
        Ok(recorded.unwrap_or_else(|| snapshot.id.as_str()))
    }

    async fn record_success(
        &self,
        item: &SyncQueueItem,
        receipt: &RemoteReceipt,
        more_for_replica: bool,
    ) {
        let result = self
            .update_replica(item, |replica| {
                if receipt.server_id.is_some() {
                    replica.server_id.clone_from(&receipt.server_id);
                }
                if receipt.server_version.is_some() {
                    replica.server_version = receipt.server_version;
                }
                if !more_for_replica {
                    replica.sync_status = SyncStatus::Synced;
                    replica.error = None;
                }
            })
            .await;

        if let Err(error) = result {
            tracing::warn!(
                "Could not record sync success for work log {}: {}",
                item.work_log_id,
                error
            );
        }
    }

    async fn record_failure(&self, item: &SyncQueueItem, message: &str) {
        let result = self
            .update_replica(item, |replica| {
                replica.sync_status = SyncStatus::Error;
                replica.error = Some(message.to_string());
            })
            .await;

        if let Err(error) = result {
            tracing::warn!(
                "Could not record sync failure for work log {}: {}",
                item.work_log_id,
                error
            );
        }
    }

    async fn update_replica(
        &self,
        item: &SyncQueueItem,
        update: impl FnOnce(&mut WorkLog),
    ) -> Result<()> {
        let Some(mut replica) = self
            .store
            .get::<WorkLog>(&item.work_log_id.as_str())
            .await?
        else {
            return Ok(());
        };

        update(&mut replica);
        self.store.put(&replica).await
    }
}
