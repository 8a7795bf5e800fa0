//! Remote work log API client.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::WorkLog;
use crate::util::clip_error_text;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure before a response arrived
    #[error("Network request rejected: {0}")]
    NetworkRejected(#[from] reqwest::Error),
    /// Non-2xx response
    #[error("Server error: {message}")]
    ServerError { status: u16, message: String },
    /// No remote endpoint is configured for this client
    #[error("Remote API is not configured")]
    NotConfigured,
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Work log fields sent on create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogPayload {
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub description: String,
    pub tags: Vec<String>,
}

impl From<&WorkLog> for WorkLogPayload {
    fn from(snapshot: &WorkLog) -> Self {
        Self {
            start_at: millis_to_datetime(snapshot.start_at),
            end_at: snapshot.end_at.map(millis_to_datetime),
            description: snapshot.description.clone(),
            tags: snapshot.tags.clone(),
        }
    }
}

fn millis_to_datetime(timestamp_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_default()
}

/// One remote call derived from a queued mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    Create { payload: WorkLogPayload },
    Update { id: String, payload: WorkLogPayload },
    Delete { id: String },
}

impl RemoteRequest {
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Create { .. } => "POST",
            Self::Update { .. } => "PUT",
            Self::Delete { .. } => "DELETE",
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Create { .. } => "/api/worklogs".to_string(),
            Self::Update { id, .. } | Self::Delete { id } => format!("/api/worklogs/{id}"),
        }
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&WorkLogPayload> {
        match self {
            Self::Create { payload } | Self::Update { payload, .. } => Some(payload),
            Self::Delete { .. } => None,
        }
    }
}

/// What a successful response told us about the server record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteReceipt {
    pub server_id: Option<String>,
    pub server_version: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ReceiptBody {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    version: Option<i64>,
}

impl RemoteReceipt {
    /// Best-effort read of `id`/`version` from a success body; anything else is ignored
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        let Ok(parsed) = serde_json::from_str::<ReceiptBody>(body) else {
            return Self::default();
        };

        let server_id = match parsed.id {
            Some(serde_json::Value::String(id)) if !id.trim().is_empty() => {
                Some(id.trim().to_string())
            }
            Some(serde_json::Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Self {
            server_id,
            server_version: parsed.version,
        }
    }
}

/// Remote side of the sync processor
#[allow(async_fn_in_trait)]
pub trait WorkLogApi {
    async fn send(&self, request: &RemoteRequest) -> SyncResult<RemoteReceipt>;
}

/// reqwest-backed [`WorkLogApi`]
#[derive(Clone)]
pub struct HttpWorkLogApi {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpWorkLogApi {
    pub fn new(config: ApiConfig) -> SyncResult<Self> {
        Ok(Self {
            config,
            client: reqwest::Client::builder().build()?,
        })
    }

    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl WorkLogApi for HttpWorkLogApi {
    async fn send(&self, request: &RemoteRequest) -> SyncResult<RemoteReceipt> {
        let url = format!("{}{}", self.config.base_url(), request.path());
        let builder = match request {
            RemoteRequest::Create { payload } => self.client.post(&url).json(payload),
            RemoteRequest::Update { payload, .. } => self.client.put(&url).json(payload),
            RemoteRequest::Delete { .. } => self.client.delete(&url),
        };
        let builder = match self.config.auth_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::ServerError {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }

        let body = response.text().await?;
        Ok(RemoteReceipt::from_body(&body))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", clip_error_text(&message), status.as_u16());
        }
    }

    let trimmed = clip_error_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
