//! Sync indicator state shared by clients.

use serde::Serialize;

use crate::models::WorkLog;

/// Headline sync state for a status indicator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Offline,
    Pending,
    Synced,
    Error,
}

/// Snapshot of local sync health for one user
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub online: bool,
    /// Queued mutations not yet confirmed
    pub pending: usize,
    /// Queued mutations that exhausted their retries
    pub failed: usize,
    pub active: Option<WorkLog>,
}

impl SyncSummary {
    pub const fn state(&self) -> SyncState {
        if !self.online {
            SyncState::Offline
        } else if self.failed > 0 {
            SyncState::Error
        } else if self.pending > 0 {
            SyncState::Pending
        } else {
            SyncState::Synced
        }
    }

    /// "N changes pending", or `None` when the queue is empty
    pub fn pending_label(&self) -> Option<String> {
        match self.pending {
            0 => None,
            1 => Some("1 change pending".to_string()),
            n => Some(format!("{n} changes pending")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(online: bool, pending: usize, failed: usize) -> SyncSummary {
        SyncSummary {
            online,
            pending,
            failed,
            active: None,
        }
    }

    #[test]
    fn offline_wins_over_queue_state() {
        assert_eq!(summary(false, 3, 1).state(), SyncState::Offline);
    }

    #[test]
    fn failed_items_mark_error() {
        assert_eq!(summary(true, 2, 1).state(), SyncState::Error);
        assert_eq!(summary(true, 2, 0).state(), SyncState::Pending);
        assert_eq!(summary(true, 0, 0).state(), SyncState::Synced);
    }

    #[test]
    fn pending_label_pluralizes() {
        assert_eq!(summary(true, 0, 0).pending_label(), None);
        assert_eq!(
            summary(true, 1, 0).pending_label().as_deref(),
            Some("1 change pending")
        );
        assert_eq!(
            summary(false, 4, 0).pending_label().as_deref(),
            Some("4 changes pending")
        );
    }
}
