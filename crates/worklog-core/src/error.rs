//! Error types for worklog-core

use thiserror::Error;

/// Result type alias using worklog-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in worklog-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local store could not be opened, is closed, or rejected a statement
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `stop`/`switch` requested without an active work log
    #[error("No active work log to stop")]
    NoActiveWork,

    /// Unexpected failure inside an offline action; the cause is kept as source
    #[error("Offline {action} failed: {source}")]
    OfflineActionFailed {
        action: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<libsql::Error> for Error {
    fn from(error: libsql::Error) -> Self {
        Self::StorageUnavailable(error.to_string())
    }
}

impl Error {
    /// Wrap a local failure raised while running an offline action.
    ///
    /// Validation errors pass through untouched so callers can still match on them.
    pub(crate) fn into_action_failure(self, action: &'static str) -> Self {
        match self {
            Self::NoActiveWork | Self::OfflineActionFailed { .. } => self,
            other => Self::OfflineActionFailed {
                action,
                source: Box::new(other),
            },
        }
    }

    /// Returns true when the error (or its wrapped cause) is a storage failure.
    pub fn is_storage_unavailable(&self) -> bool {
        match self {
            Self::StorageUnavailable(_) => true,
            Self::OfflineActionFailed { source, .. } => source.is_storage_unavailable(),
            _ => false,
        }
    }
}
