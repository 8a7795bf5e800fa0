//! Remote API selection for the CLI.

use worklog_core::config::ApiConfig;
use worklog_core::sync::{
    HttpWorkLogApi, RemoteReceipt, RemoteRequest, SyncError, SyncResult, WorkLogApi,
};

use crate::error::CliError;

/// HTTP client when a base URL is configured, otherwise local-only
pub enum RemoteApi {
    Http(HttpWorkLogApi),
    LocalOnly,
}

impl RemoteApi {
    pub fn from_config(config: Option<ApiConfig>) -> Result<Self, CliError> {
        let Some(config) = config else {
            return Ok(Self::LocalOnly);
        };
        let api = HttpWorkLogApi::new(config).map_err(|error| CliError::Config(error.to_string()))?;
        Ok(Self::Http(api))
    }

    pub const fn is_configured(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl WorkLogApi for RemoteApi {
    async fn send(&self, request: &RemoteRequest) -> SyncResult<RemoteReceipt> {
        match self {
            Self::Http(api) => api.send(request).await,
            Self::LocalOnly => Err(SyncError::NotConfigured),
        }
    }
}
