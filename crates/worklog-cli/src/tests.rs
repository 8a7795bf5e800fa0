use std::path::PathBuf;

use pretty_assertions::assert_eq;
use worklog_core::models::{Operation, SyncQueueItem, WorkLog};
use worklog_core::state::SyncSummary;
use worklog_core::sync::{RemoteRequest, SyncError, SyncOutcome, SyncReport, WorkLogApi};

use crate::commands::common::{
    describe_sync, format_duration, format_queue_lines, format_report, format_status_lines,
    format_timestamp, join_description, queue_item_to_list_item, status_to_item, Context,
};
use crate::commands::completions::run_completions;
use crate::commands::config::{format_config_lines, merge_config_init};
use crate::commands::purge::run_purge;
use crate::commands::start::run_start;
use crate::commands::stop::run_stop;
use crate::commands::switch::run_switch;
use crate::commands::sync::run_sync;
use crate::config::{CliConfig, ENV_API_TOKEN, ENV_API_URL, ENV_USER_ID};
use crate::error::CliError;
use crate::remote::RemoteApi;

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn local_context(dir: &tempfile::TempDir) -> Context {
    Context::new(
        dir.path().join("worklog.db"),
        false,
        CliConfig {
            user_id: Some("tester".to_string()),
            ..CliConfig::default()
        }
        .normalized(),
    )
}

#[test]
fn format_duration_pads_minutes_and_seconds() {
    assert_eq!(format_duration(0), "0h00m00s");
    assert_eq!(format_duration(3725), "1h02m05s");
    assert_eq!(format_duration(36_000), "10h00m00s");
    assert_eq!(format_duration(-5), "0h00m00s");
}

#[test]
fn join_description_trims_and_rejects_empty() {
    assert_eq!(
        join_description(&words("  fix   login bug ")),
        Some("fix login bug".to_string())
    );
    assert_eq!(join_description(&[]), None);
    assert_eq!(join_description(&[" ".to_string()]), None);
}

#[test]
fn format_timestamp_returns_utc_label() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn format_report_mentions_leftovers() {
    assert_eq!(format_report(&SyncReport::default()), "nothing to sync");
    assert_eq!(
        format_report(&SyncReport {
            processed: 1,
            succeeded: 1,
            abandoned: 0,
            attempts: 1,
        }),
        "synced 1 change"
    );
    assert_eq!(
        format_report(&SyncReport {
            processed: 3,
            succeeded: 2,
            abandoned: 1,
            attempts: 7,
        }),
        "synced 2 changes, 1 still pending"
    );
}

#[test]
fn describe_sync_covers_every_outcome() {
    assert_eq!(
        describe_sync(Some(&SyncOutcome::Offline)),
        "offline, change queued"
    );
    assert_eq!(describe_sync(Some(&SyncOutcome::Scheduled)), "sync scheduled");
    assert_eq!(
        describe_sync(Some(&SyncOutcome::Coalesced)),
        "sync already in progress"
    );
    assert!(describe_sync(None).contains("queued"));
}

#[test]
fn status_lines_show_active_work_and_pending_label() {
    let mut log = WorkLog::start("tester", "write docs", vec!["docs".to_string()], 0);
    log.id = "11111111-1111-7111-8111-111111111111".parse().unwrap();
    let summary = SyncSummary {
        online: true,
        pending: 2,
        failed: 0,
        active: Some(log),
    };

    let lines = format_status_lines(&summary, 3_725_000);
    assert_eq!(
        lines,
        vec![
            "Tracking: 11111111-1111  write docs  #docs (since 1970-01-01 00:00:00 UTC, 1h02m05s)"
                .to_string(),
            "Sync: pending, 2 changes pending".to_string(),
        ]
    );

    let item = status_to_item(&summary, 3_725_000);
    assert_eq!(item.elapsed_secs, Some(3725));
}

#[test]
fn status_lines_without_active_work() {
    let summary = SyncSummary {
        online: false,
        pending: 0,
        failed: 0,
        active: None,
    };
    assert_eq!(
        format_status_lines(&summary, 0),
        vec!["No active work".to_string(), "Sync: offline".to_string()]
    );
}

#[test]
fn queue_lines_include_retry_metadata() {
    let mut log = WorkLog::start("tester", "review", Vec::new(), 0);
    log.id = "22222222-2222-7222-8222-222222222222".parse().unwrap();
    let mut item = SyncQueueItem::for_replica(&log, 0);
    item.retry_count = 5;
    item.last_error = Some("Server error: boom".to_string());

    let lines = format_queue_lines(std::slice::from_ref(&item));
    assert_eq!(
        lines,
        vec![
            "1970-01-01 00:00:00 UTC  create  22222222-2222  retries=5  last_error=Server error: boom"
                .to_string()
        ]
    );

    let json_item = queue_item_to_list_item(&item);
    assert_eq!(json_item.operation, "create");
    assert_eq!(json_item.retry_count, 5);
}

#[test]
fn config_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = CliConfig {
        version: 1,
        api_base_url: Some(" https://api.example.com/ ".to_string()),
        api_token: Some("secret".to_string()),
        user_id: Some("  ".to_string()),
    };

    config.save_to_path(&path).unwrap();
    let loaded = CliConfig::load_from_path(&path).unwrap();

    assert_eq!(
        loaded.api_base_url.as_deref(),
        Some("https://api.example.com")
    );
    assert_eq!(loaded.api_token.as_deref(), Some("secret"));
    assert_eq!(loaded.user_id, None);
    assert_eq!(loaded.user_id(), "local");
}

#[test]
fn missing_config_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = CliConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.api_base_url, None);
}

#[test]
fn env_overrides_replace_file_values() {
    let config = CliConfig {
        api_base_url: Some("https://file.example.com".to_string()),
        ..CliConfig::default()
    }
    .apply_overrides(|key| match key {
        ENV_API_URL => Some("https://env.example.com/".to_string()),
        ENV_API_TOKEN => Some("token".to_string()),
        ENV_USER_ID => Some(" ".to_string()),
        _ => None,
    });

    assert_eq!(
        config.api_base_url.as_deref(),
        Some("https://env.example.com")
    );
    assert_eq!(config.api_token.as_deref(), Some("token"));
    assert_eq!(config.user_id, None);
}

#[test]
fn merge_config_init_rejects_non_http_urls() {
    let result = merge_config_init(
        CliConfig::default(),
        Some("ftp://api.example.com".to_string()),
        None,
        None,
    );
    assert!(matches!(result, Err(CliError::Config(_))));

    let merged = merge_config_init(
        CliConfig {
            user_id: Some("kept".to_string()),
            ..CliConfig::default()
        },
        Some("https://api.example.com".to_string()),
        None,
        None,
    )
    .unwrap();
    assert_eq!(merged.user_id.as_deref(), Some("kept"));
    assert_eq!(
        format_config_lines(&merged),
        vec![
            "api_base_url: https://api.example.com".to_string(),
            "api_token: (not set)".to_string(),
            "user_id: kept".to_string(),
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn local_only_remote_refuses_to_send() {
    let remote = RemoteApi::from_config(None).unwrap();
    assert!(!remote.is_configured());

    let result = remote
        .send(&RemoteRequest::Delete {
            id: "abc".to_string(),
        })
        .await;
    assert!(matches!(result, Err(SyncError::NotConfigured)));
}

#[tokio::test(flavor = "current_thread")]
async fn start_stop_flow_queues_changes_locally() {
    let dir = tempfile::tempdir().unwrap();
    let context = local_context(&dir);

    run_start(&words("plan sprint"), &["Planning".to_string()], &context)
        .await
        .unwrap();
    let again = run_start(&words("second"), &[], &context).await;
    assert!(matches!(again, Err(CliError::AlreadyActive(description)) if description == "plan sprint"));

    run_stop(&[], &[], &context).await.unwrap();

    let service = context.open_service().await.unwrap();
    let operations = service
        .pending_items()
        .await
        .unwrap()
        .iter()
        .map(SyncQueueItem::operation)
        .collect::<Vec<_>>();
    assert_eq!(operations, vec![Operation::Create, Operation::Update]);
    assert_eq!(service.actions().active_for("tester").await.unwrap(), None);
}

#[tokio::test(flavor = "current_thread")]
async fn switch_and_stop_require_active_work() {
    let dir = tempfile::tempdir().unwrap();
    let context = local_context(&dir);

    let switched = run_switch(&words("next task"), &[], &context).await;
    assert!(matches!(
        switched,
        Err(CliError::Core(worklog_core::Error::NoActiveWork))
    ));
    let stopped = run_stop(&[], &[], &context).await;
    assert!(matches!(
        stopped,
        Err(CliError::Core(worklog_core::Error::NoActiveWork))
    ));

    let empty = run_start(&[], &[], &context).await;
    assert!(matches!(empty, Err(CliError::EmptyDescription)));
}

#[tokio::test(flavor = "current_thread")]
async fn switch_replaces_the_active_session() {
    let dir = tempfile::tempdir().unwrap();
    let context = local_context(&dir);

    run_start(&words("first"), &[], &context).await.unwrap();
    run_switch(&words("second"), &["Focus".to_string()], &context)
        .await
        .unwrap();

    let service = context.open_service().await.unwrap();
    let active = service
        .actions()
        .active_for("tester")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.description, "second");
    assert_eq!(active.tags, vec!["focus"]);
    assert_eq!(service.pending_items().await.unwrap().len(), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn sync_without_api_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let context = local_context(&dir);

    let result = run_sync(&context).await;
    assert!(matches!(result, Err(CliError::ApiNotConfigured)));
}

#[tokio::test(flavor = "current_thread")]
async fn offline_flag_keeps_changes_queued_with_api_configured() {
    let dir = tempfile::tempdir().unwrap();
    let context = Context::new(
        dir.path().join("worklog.db"),
        true,
        CliConfig {
            api_base_url: Some("http://127.0.0.1:9".to_string()),
            ..CliConfig::default()
        }
        .normalized(),
    );

    run_start(&words("on a plane"), &[], &context).await.unwrap();
    run_sync(&context).await.unwrap();

    let service = context.open_service().await.unwrap();
    assert!(!service.network().is_online());
    assert_eq!(service.pending_items().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn purge_with_nothing_synced_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let context = local_context(&dir);

    run_start(&words("unsynced"), &[], &context).await.unwrap();
    run_purge(&context).await.unwrap();

    let service = context.open_service().await.unwrap();
    assert!(service.actions().active_for("tester").await.unwrap().is_some());
}

#[test]
fn run_completions_writes_bash_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_path: PathBuf = dir.path().join("worklog.bash");

    run_completions(clap_complete::Shell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_worklog()"));
    assert!(script.contains("complete -F _worklog"));
}
