//! Collection-scoped record store.
//!
//! Each collection is one table whose `record` column holds the JSON body;
//! indexed fields are mirrored into plain columns so lookups stay in SQL.

use std::sync::Arc;

use libsql::params::Params;
use libsql::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use super::connection::{Database, StoreLocation};
use crate::error::{Error, Result};
use crate::models::{SyncQueueItem, SyncStatus, WorkLog};

/// Named record collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    WorkLogs,
    SyncQueue,
}

impl Collection {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WorkLogs => "workLogs",
            Self::SyncQueue => "syncQueue",
        }
    }

    const fn table(self) -> &'static str {
        match self {
            Self::WorkLogs => "work_logs",
            Self::SyncQueue => "sync_queue",
        }
    }

    const fn index_columns(self) -> &'static [&'static str] {
        match self {
            Self::WorkLogs => &["sync_status", "user_id"],
            Self::SyncQueue => &["timestamp"],
        }
    }
}

/// Secondary lookup index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    SyncStatus,
    UserId,
    Timestamp,
}

impl Index {
    #[must_use]
    pub const fn collection(self) -> Collection {
        match self {
            Self::SyncStatus | Self::UserId => Collection::WorkLogs,
            Self::Timestamp => Collection::SyncQueue,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SyncStatus => "syncStatus",
            Self::UserId => "userId",
            Self::Timestamp => "timestamp",
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::SyncStatus => "sync_status",
            Self::UserId => "user_id",
            Self::Timestamp => "timestamp",
        }
    }
}

/// Value looked up through an [`Index`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    Text(String),
    Integer(i64),
}

impl From<&str> for IndexKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for IndexKey {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<SyncStatus> for IndexKey {
    fn from(value: SyncStatus) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<IndexKey> for Value {
    fn from(key: IndexKey) -> Self {
        match key {
            IndexKey::Text(text) => Self::Text(text),
            IndexKey::Integer(integer) => Self::Integer(integer),
        }
    }
}

/// A type persisted in one collection
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    /// Primary key
    fn key(&self) -> String;

    /// Values for `COLLECTION`'s index columns, in declaration order
    fn index_values(&self) -> Vec<Value>;
}

impl Record for WorkLog {
    const COLLECTION: Collection = Collection::WorkLogs;

    fn key(&self) -> String {
        self.id.as_str()
    }

    fn index_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.sync_status.as_str().to_string()),
            Value::Text(self.user_id.clone()),
        ]
    }
}

impl Record for SyncQueueItem {
    const COLLECTION: Collection = Collection::SyncQueue;

    fn key(&self) -> String {
        self.id.as_str()
    }

    fn index_values(&self) -> Vec<Value> {
        vec![Value::Integer(self.timestamp)]
    }
}

struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// Upsert; `ON CONFLICT DO UPDATE` keeps the rowid so insertion order survives
    fn put<R: Record>(record: &R) -> Result<Self> {
        let collection = R::COLLECTION;
        let mut columns = vec!["id"];
        columns.extend_from_slice(collection.index_columns());
        columns.push("record");

        let placeholders = vec!["?"; columns.len()].join(", ");
        let updates = columns[1..]
            .iter()
            .map(|column| format!("{column} = excluded.{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) ON CONFLICT(id) DO UPDATE SET {updates}",
            collection.table(),
            columns.join(", "),
        );

        let mut params = Vec::with_capacity(columns.len());
        params.push(Value::Text(record.key()));
        params.extend(record.index_values());
        params.push(Value::Text(serde_json::to_string(record)?));

        Ok(Self { sql, params })
    }

    fn delete(collection: Collection, id: &str) -> Self {
        Self {
            sql: format!("DELETE FROM {} WHERE id = ?", collection.table()),
            params: vec![Value::Text(id.to_string())],
        }
    }
}

/// Puts and deletes applied together in one storage transaction
#[derive(Default)]
pub struct WriteBatch {
    statements: Vec<Statement>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<R: Record>(&mut self, record: &R) -> Result<&mut Self> {
        self.statements.push(Statement::put(record)?);
        Ok(self)
    }

    pub fn delete<R: Record>(&mut self, id: &str) -> &mut Self {
        self.statements.push(Statement::delete(R::COLLECTION, id));
        self
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

enum StoreState {
    Unopened,
    Open(Database),
    Closed,
}

/// Durable key-value store with two typed collections.
///
/// The handle is cheap to clone; all clones share one connection. The
/// database is opened lazily on first use and migrated on open.
#[derive(Clone)]
pub struct Store {
    location: StoreLocation,
    state: Arc<Mutex<StoreState>>,
}

impl Store {
    /// Create an unopened store handle
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            state: Arc::new(Mutex::new(StoreState::Unopened)),
        }
    }

    /// Create an unopened in-memory store
    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub const fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Open and migrate the database; a no-op when already open
    pub async fn open(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.ensure_open(&mut state).await.map(|_| ())
    }

    /// Release the connection; later calls fail with `StorageUnavailable`
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        *state = StoreState::Closed;
        tracing::debug!("Closed local store");
    }

    pub async fn is_closed(&self) -> bool {
        matches!(*self.state.lock().await, StoreState::Closed)
    }

    async fn ensure_open<'a>(&self, state: &'a mut StoreState) -> Result<&'a Database> {
        if matches!(state, StoreState::Unopened) {
            let database = Database::open_location(&self.location).await?;
            *state = StoreState::Open(database);
        }

        match state {
            StoreState::Open(database) => Ok(&*database),
            StoreState::Closed => Err(Error::StorageUnavailable("store is closed".to_string())),
            StoreState::Unopened => Err(Error::StorageUnavailable(
                "store could not be opened".to_string(),
            )),
        }
    }

    async fn execute(&self, statement: Statement) -> Result<u64> {
        let mut state = self.state.lock().await;
        let database = self.ensure_open(&mut state).await?;
        let affected = database
            .connection()
            .execute(&statement.sql, Params::Positional(statement.params))
            .await?;
        Ok(affected)
    }

    async fn query_records<R: Record>(&self, sql: &str, params: Vec<Value>) -> Result<Vec<R>> {
        let mut state = self.state.lock().await;
        let database = self.ensure_open(&mut state).await?;
        let mut rows = database
            .connection()
            .query(sql, Params::Positional(params))
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let body: String = row.get(0)?;
            records.push(serde_json::from_str(&body)?);
        }
        Ok(records)
    }

    /// Fetch one record by primary key
    pub async fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
        let sql = format!("SELECT record FROM {} WHERE id = ?", R::COLLECTION.table());
        let mut records = self
            .query_records::<R>(&sql, vec![Value::Text(id.to_string())])
            .await?;
        Ok(records.pop())
    }

    /// Insert or replace a record
    pub async fn put<R: Record>(&self, record: &R) -> Result<()> {
        self.execute(Statement::put(record)?).await?;
        Ok(())
    }

    /// All records whose `index` equals `key`, in insertion order
    pub async fn get_all_by_index<R: Record>(
        &self,
        index: Index,
        key: impl Into<IndexKey>,
    ) -> Result<Vec<R>> {
        Self::check_index::<R>(index)?;
        let sql = format!(
            "SELECT record FROM {} WHERE {} = ? ORDER BY rowid ASC",
            R::COLLECTION.table(),
            index.column()
        );
        self.query_records(&sql, vec![key.into().into()]).await
    }

    /// Whole collection in ascending `index` order, ties in insertion order
    pub async fn get_all_sorted<R: Record>(&self, index: Index) -> Result<Vec<R>> {
        Self::check_index::<R>(index)?;
        let sql = format!(
            "SELECT record FROM {} ORDER BY {} ASC, rowid ASC",
            R::COLLECTION.table(),
            index.column()
        );
        self.query_records(&sql, Vec::new()).await
    }

    /// Delete a record; missing ids are ignored
    pub async fn delete<R: Record>(&self, id: &str) -> Result<()> {
        self.execute(Statement::delete(R::COLLECTION, id)).await?;
        Ok(())
    }

    /// Remove every record of `collection`
    pub async fn clear(&self, collection: Collection) -> Result<()> {
        self.execute(Statement {
            sql: format!("DELETE FROM {}", collection.table()),
            params: Vec::new(),
        })
        .await?;
        Ok(())
    }

    /// Number of records in `collection`
    pub async fn count(&self, collection: Collection) -> Result<usize> {
        let mut state = self.state.lock().await;
        let database = self.ensure_open(&mut state).await?;
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let mut rows = database.connection().query(&sql, ()).await?;

        let count: i64 = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            0
        };
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Apply every statement of `batch` atomically
    pub async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock().await;
        let database = self.ensure_open(&mut state).await?;
        let conn = database.connection();

        conn.execute("BEGIN TRANSACTION", ()).await?;

        for statement in batch.statements {
            if let Err(e) = conn
                .execute(&statement.sql, Params::Positional(statement.params))
                .await
            {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }

        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    fn check_index<R: Record>(index: Index) -> Result<()> {
        if index.collection() == R::COLLECTION {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "index '{}' does not belong to collection '{}'",
                index.name(),
                R::COLLECTION.name()
            )))
        }
    }
}
