//! Durable mutation queue backed by the local store.
//!
//! Thin wrappers only: no retry and no network logic lives here.

use crate::db::{Collection, Index, Store};
use crate::error::Result;
use crate::models::{QueueItemId, QueueItemPatch, SyncQueueItem};

/// Timestamp-ordered list of pending mutations
#[derive(Clone)]
pub struct MutationQueue {
    store: Store,
}

impl MutationQueue {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append an item
    pub async fn enqueue(&self, item: &SyncQueueItem) -> Result<()> {
        self.store.put(item).await?;
        tracing::debug!(
            "Queued {} for work log {}",
            item.operation(),
            item.work_log_id
        );
        Ok(())
    }

    /// All items, ascending by enqueue timestamp
    pub async fn drain_ordered(&self) -> Result<Vec<SyncQueueItem>> {
        self.store.get_all_sorted(Index::Timestamp).await
    }

    /// Delete an item; missing ids are a no-op
    pub async fn remove(&self, id: &QueueItemId) -> Result<()> {
        self.store.delete::<SyncQueueItem>(&id.as_str()).await
    }

    /// Merge `patch` into an existing item and return it; missing ids are a no-op
    pub async fn patch(
        &self,
        id: &QueueItemId,
        patch: QueueItemPatch,
    ) -> Result<Option<SyncQueueItem>> {
        let Some(mut item) = self.store.get::<SyncQueueItem>(&id.as_str()).await? else {
            return Ok(None);
        };

        patch.apply(&mut item);
        self.store.put(&item).await?;
        Ok(Some(item))
    }

    /// Drop every queued item
    pub async fn clear(&self) -> Result<()> {
        self.store.clear(Collection::SyncQueue).await
    }

    /// Number of queued items
    pub async fn len(&self) -> Result<usize> {
        self.store.count(Collection::SyncQueue).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
