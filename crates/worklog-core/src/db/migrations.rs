//! Database migrations

use crate::error::Result;
use libsql::Connection;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version < 1 {
        migrate_v1(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
pub(crate) async fn get_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

/// Migration to version 1: work log replicas and the sync queue
async fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    let statements = [
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        // Replicas: JSON body plus the indexed fields mirrored into columns
        "CREATE TABLE IF NOT EXISTS work_logs (
            id TEXT PRIMARY KEY,
            sync_status TEXT NOT NULL,
            user_id TEXT NOT NULL,
            record TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_work_logs_sync_status ON work_logs(sync_status)",
        "CREATE INDEX IF NOT EXISTS idx_work_logs_user_id ON work_logs(user_id)",
        "CREATE TABLE IF NOT EXISTS sync_queue (
            id TEXT PRIMARY KEY,
            timestamp INTEGER NOT NULL,
            record TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_sync_queue_timestamp ON sync_queue(timestamp)",
        "INSERT INTO schema_version (version) VALUES (1)",
    ];

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated local store to version {CURRENT_VERSION}");
    Ok(())
}
