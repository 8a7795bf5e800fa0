use std::env;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use worklog_core::models::{SyncQueueItem, WorkLog};
use worklog_core::services::{ServiceOptions, WorkLogService};
use worklog_core::state::{SyncState, SyncSummary};
use worklog_core::sync::{SyncOutcome, SyncReport};

use crate::cli::GlobalArgs;
use crate::config::{CliConfig, ENV_DB_PATH};
use crate::error::CliError;
use crate::remote::RemoteApi;

/// Resolved settings shared by every command that touches the store
#[derive(Debug, Clone)]
pub struct Context {
    pub db_path: PathBuf,
    pub offline: bool,
    pub config: CliConfig,
}

impl Context {
    pub fn new(db_path: PathBuf, offline: bool, config: CliConfig) -> Self {
        Self {
            db_path,
            offline,
            config,
        }
    }

    /// Config file, then environment, then command-line flags
    pub fn load(global: &GlobalArgs) -> Result<Self, CliError> {
        let mut config = CliConfig::load()?.with_env_overrides();
        if let Some(user) = global.user.clone() {
            config.user_id = Some(user);
            config = config.normalized();
        }
        Ok(Self::new(
            resolve_db_path(global.db_path.clone()),
            global.offline,
            config,
        ))
    }

    pub fn user_id(&self) -> String {
        self.config.user_id()
    }

    pub fn remote(&self) -> Result<RemoteApi, CliError> {
        RemoteApi::from_config(self.config.api_config()?)
    }

    pub async fn open_service(&self) -> Result<WorkLogService<RemoteApi>, CliError> {
        let remote = self.remote()?;
        let platform_online = if !remote.is_configured() {
            tracing::info!("Running in local-only mode (no API configured)");
            Some(false)
        } else if self.offline {
            Some(false)
        } else {
            None
        };

        let options = ServiceOptions::default().with_platform_online(platform_online);
        Ok(WorkLogService::open_path(self.db_path.clone(), remote, options).await?)
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os(ENV_DB_PATH).map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("worklog")
        .join("worklog.db")
}

pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Joined, trimmed words; `None` when nothing is left
pub fn join_description(parts: &[String]) -> Option<String> {
    let joined = parts.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Duration as `HhMMmSSs`, e.g. `1h02m05s`
pub fn format_duration(total_secs: i64) -> String {
    let total = total_secs.max(0);
    format!(
        "{}h{:02}m{:02}s",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

pub fn format_report(report: &SyncReport) -> String {
    if report.processed == 0 {
        "nothing to sync".to_string()
    } else if report.abandoned == 0 {
        format!("synced {}", plural(report.succeeded, "change"))
    } else {
        format!(
            "synced {}, {} still pending",
            plural(report.succeeded, "change"),
            report.abandoned
        )
    }
}

/// One-line summary of what the automatic sync after an action did
pub fn describe_sync(outcome: Option<&SyncOutcome>) -> String {
    match outcome {
        None => "sync failed locally; change stays queued".to_string(),
        Some(SyncOutcome::Offline) => "offline, change queued".to_string(),
        Some(SyncOutcome::Scheduled) => "sync scheduled".to_string(),
        Some(SyncOutcome::Coalesced) => "sync already in progress".to_string(),
        Some(SyncOutcome::Completed(report)) => format_report(report),
    }
}

pub fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_work_log_line(log: &WorkLog) -> String {
    let tags = render_tags(&log.tags);
    if tags.is_empty() {
        format!("{}  {}", short_id(&log.id.as_str()), log.description)
    } else {
        format!("{}  {}  {}", short_id(&log.id.as_str()), log.description, tags)
    }
}

pub const fn state_label(state: SyncState) -> &'static str {
    match state {
        SyncState::Offline => "offline",
        SyncState::Pending => "pending",
        SyncState::Synced => "synced",
        SyncState::Error => "error",
    }
}

#[derive(Debug, Serialize)]
pub struct StatusItem {
    pub state: SyncState,
    pub online: bool,
    pub pending: usize,
    pub failed: usize,
    pub active: Option<WorkLog>,
    pub elapsed_secs: Option<i64>,
}

pub fn status_to_item(summary: &SyncSummary, now_ms: i64) -> StatusItem {
    StatusItem {
        state: summary.state(),
        online: summary.online,
        pending: summary.pending,
        failed: summary.failed,
        elapsed_secs: summary
            .active
            .as_ref()
            .map(|log| (now_ms - log.start_at).max(0) / 1000),
        active: summary.active.clone(),
    }
}

pub fn format_status_lines(summary: &SyncSummary, now_ms: i64) -> Vec<String> {
    let mut lines = Vec::new();
    match &summary.active {
        Some(log) => lines.push(format!(
            "Tracking: {} (since {}, {})",
            format_work_log_line(log),
            format_timestamp(log.start_at),
            format_duration((now_ms - log.start_at).max(0) / 1000)
        )),
        None => lines.push("No active work".to_string()),
    }

    let mut sync_line = format!("Sync: {}", state_label(summary.state()));
    if let Some(label) = summary.pending_label() {
        let _ = write!(sync_line, ", {label}");
    }
    if summary.failed > 0 {
        let _ = write!(sync_line, " ({} failing)", summary.failed);
    }
    lines.push(sync_line);
    lines
}

#[derive(Debug, Serialize)]
pub struct QueueListItem {
    pub id: String,
    pub work_log_id: String,
    pub operation: String,
    pub timestamp: i64,
    pub timestamp_iso: String,
    pub retry_count: u32,
    pub last_error: Option<String>,
}

pub fn queue_item_to_list_item(item: &SyncQueueItem) -> QueueListItem {
    QueueListItem {
        id: item.id.to_string(),
        work_log_id: item.work_log_id.to_string(),
        operation: item.operation().to_string(),
        timestamp: item.timestamp,
        timestamp_iso: format_timestamp(item.timestamp),
        retry_count: item.retry_count,
        last_error: item.last_error.clone(),
    }
}

pub fn format_queue_lines(items: &[SyncQueueItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let mut line = format!(
                "{}  {:<6}  {}  retries={}",
                format_timestamp(item.timestamp),
                item.operation().as_str(),
                short_id(&item.work_log_id.as_str()),
                item.retry_count
            );
            if let Some(error) = &item.last_error {
                let _ = write!(line, "  last_error={error}");
            }
            line
        })
        .collect()
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
