//! Sync queue item model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::work_log::{Operation, WorkLog, WorkLogId};

/// Identifier of a queued mutation, distinct from the replica it targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueItemId(Uuid);

impl QueueItemId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for QueueItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueueItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One intended remote mutation with a self-contained replica snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "data", rename_all = "lowercase")]
pub enum Mutation {
    Create(WorkLog),
    Update(WorkLog),
    Delete(WorkLog),
}

impl Mutation {
    /// Build the mutation matching the replica's last local operation
    #[must_use]
    pub fn from_replica(replica: &WorkLog) -> Self {
        match replica.operation {
            Operation::Create => Self::Create(replica.clone()),
            Operation::Update => Self::Update(replica.clone()),
            Operation::Delete => Self::Delete(replica.clone()),
        }
    }

    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Update(_) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> &WorkLog {
        match self {
            Self::Create(snapshot) | Self::Update(snapshot) | Self::Delete(snapshot) => snapshot,
        }
    }
}

/// Durable record of one pending mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueItem {
    pub id: QueueItemId,
    /// Replica this mutation applies to
    pub work_log_id: WorkLogId,
    pub mutation: Mutation,
    /// Enqueue time (Unix ms); defines drain order
    pub timestamp: i64,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SyncQueueItem {
    /// Snapshot `replica` into a new queue item enqueued at `timestamp`
    #[must_use]
    pub fn for_replica(replica: &WorkLog, timestamp: i64) -> Self {
        Self {
            id: QueueItemId::new(),
            work_log_id: replica.id,
            mutation: Mutation::from_replica(replica),
            timestamp,
            retry_count: 0,
            last_error: None,
        }
    }

    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.mutation.operation()
    }
}

/// Partial update merged into an existing queue item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueItemPatch {
    pub retry_count: Option<u32>,
    /// `Some(None)` clears the stored error
    pub last_error: Option<Option<String>>,
}

impl QueueItemPatch {
    /// Record a failed attempt
    #[must_use]
    pub fn failure(retry_count: u32, error: impl Into<String>) -> Self {
        Self {
            retry_count: Some(retry_count),
            last_error: Some(Some(error.into())),
        }
    }

    pub fn apply(self, item: &mut SyncQueueItem) {
        if let Some(retry_count) = self.retry_count {
            item.retry_count = retry_count;
        }
        if let Some(last_error) = self.last_error {
            item.last_error = last_error;
        }
    }
}
