//! Database connection management

use crate::error::Result;
use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::{Path, PathBuf};

use super::migrations;

/// Where the local replica store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// File-backed store; the parent directory is created on open
    Path(PathBuf),
    /// Throwaway store, mostly for tests
    Memory,
}

/// Database wrapper for a libSQL connection
pub struct Database {
    _db: LibSqlDatabase,
    conn: Connection,
}

impl Database {
    /// Open the database at `location`, running migrations.
    pub async fn open_location(location: &StoreLocation) -> Result<Self> {
        match location {
            StoreLocation::Path(path) => Self::open(path).await,
            StoreLocation::Memory => Self::open_in_memory().await,
        }
    }

    /// Open a local database at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy().to_string();
        let db = Builder::new_local(&path_str).build().await?;
        let conn = db.connect()?;

        let database = Self { _db: db, conn };
        database.configure().await?;
        database.migrate().await?;
        tracing::debug!("Opened local store at {}", path.display());
        Ok(database)
    }

    /// Open an in-memory database (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        let conn = db.connect()?;

        let database = Self { _db: db, conn };
        database.configure().await?;
        database.migrate().await?;
        Ok(database)
    }

    /// Configure `SQLite` for a single local writer
    async fn configure(&self) -> Result<()> {
        // journal_mode returns a row and is unsupported for :memory:, so errors are ignored
        self.conn
            .execute("PRAGMA journal_mode = WAL;", ())
            .await
            .ok();
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        Ok(())
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        migrations::run(&self.conn).await
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_in_memory() {
        let db = Database::open_in_memory().await.unwrap();
        let mut rows = db.connection().query("SELECT 1", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i32>(0).unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_creates_parent_directory() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("worklog.db");

        let location = StoreLocation::Path(db_path.clone());
        let _db = Database::open_location(&location).await.unwrap();
        assert!(db_path.exists());
    }
}
