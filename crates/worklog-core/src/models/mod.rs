//! Data models for Worklog

mod sync_queue;
mod work_log;

pub use sync_queue::{Mutation, QueueItemId, QueueItemPatch, SyncQueueItem};
pub use work_log::{Operation, SyncStatus, WorkLog, WorkLogId};
