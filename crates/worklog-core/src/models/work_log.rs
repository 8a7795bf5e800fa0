//! Work log replica model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a work log replica, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkLogId(Uuid);

impl WorkLogId {
    /// Create a new unique work log ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for WorkLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkLogId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Informational sync state of a replica; never used to gate the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Syncing,
    Synced,
    Error,
}

impl SyncStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of the last mutation applied locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local replica of one work session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    /// Locally generated identifier
    pub id: WorkLogId,
    /// Owner of the session
    pub user_id: String,
    /// Session start (Unix ms)
    pub start_at: i64,
    /// Session end (Unix ms); `None` while in progress
    pub end_at: Option<i64>,
    pub description: String,
    pub tags: Vec<String>,
    pub sync_status: SyncStatus,
    pub operation: Operation,
    /// Local creation timestamp (Unix ms), tiebreaker only
    pub local_created_at: i64,
    /// Identifier assigned by the remote store once the create has synced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<i64>,
    /// Last sync failure recorded for this replica
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkLog {
    /// Create a new in-progress work log starting at `start_at`
    #[must_use]
    pub fn start(
        user_id: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        start_at: i64,
    ) -> Self {
        Self {
            id: WorkLogId::new(),
            user_id: user_id.into(),
            start_at,
            end_at: None,
            description: description.into(),
            tags,
            sync_status: SyncStatus::Pending,
            operation: Operation::Create,
            local_created_at: start_at,
            server_id: None,
            server_version: None,
            error: None,
        }
    }

    /// An active record has no end timestamp yet
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.end_at.is_none()
    }

    /// Whole seconds between start and end, or `None` while active
    #[must_use]
    pub fn duration_secs(&self) -> Option<i64> {
        self.end_at
            .map(|end_at| (end_at - self.start_at).max(0) / 1000)
    }

    /// Close the record at `end_at` with the given description and tags
    pub fn close(&mut self, end_at: i64, description: String, tags: Vec<String>) {
        self.end_at = Some(end_at);
        self.description = description;
        self.tags = tags;
        self.operation = Operation::Update;
        self.sync_status = SyncStatus::Pending;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_log_id_unique() {
        let id1 = WorkLogId::new();
        let id2 = WorkLogId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_work_log_id_parse() {
        let id = WorkLogId::new();
        let parsed: WorkLogId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_start_is_active_create() {
        let log = WorkLog::start("user-1", "writing", vec!["docs".to_string()], 1_000);
        assert!(log.is_active());
        assert_eq!(log.operation, Operation::Create);
        assert_eq!(log.sync_status, SyncStatus::Pending);
        assert_eq!(log.local_created_at, 1_000);
        assert_eq!(log.duration_secs(), None);
    }

    #[test]
    fn test_close_floors_duration() {
        let mut log = WorkLog::start("user-1", "writing", Vec::new(), 1_000);
        log.close(62_999, "done".to_string(), Vec::new());
        assert_eq!(log.duration_secs(), Some(61));
        assert_eq!(log.operation, Operation::Update);
        assert_eq!(log.description, "done");
    }

    #[test]
    fn test_serializes_camel_case() {
        let log = WorkLog::start("user-1", "writing", Vec::new(), 1_000);
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["syncStatus"], "pending");
        assert_eq!(json["operation"], "create");
        assert!(json["endAt"].is_null());
        assert!(json.get("serverId").is_none());
    }
}
