//! Key-value tables for adapter state.
//!
//! Adapters persist small blobs (credentials, session tokens) in tables keyed
//! by a numeric primary key. A table must be declared with
//! [`Database::extend`] before it is read or written.
//!
//! | Implementation | Backing | Use |
//! |----------------|---------|-----|
//! | [`MemoryDatabase`] | process memory | tests, throwaway bots |
//! | [`FileDatabase`] | `<dir>/<table>.json` | real deployments |

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};

/// One row of a key-value table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key (the account number).
    pub uin: i64,
    /// Opaque payload.
    pub payload: String,
}

impl Record {
    /// Creates a record.
    pub fn new(uin: i64, payload: impl Into<String>) -> Self {
        Self {
            uin,
            payload: payload.into(),
        }
    }
}

/// Host-supplied key-value storage.
#[async_trait]
pub trait Database: Send + Sync {
    /// Declares a table. Declaring an existing table is a no-op.
    async fn extend(&self, table: &str) -> StoreResult<()>;

    /// Looks up a record by primary key.
    async fn get(&self, table: &str, uin: i64) -> StoreResult<Option<Record>>;

    /// Inserts a new record; fails with [`StoreError::Duplicate`] if the key exists.
    async fn create(&self, table: &str, record: Record) -> StoreResult<()>;
}

type Table = BTreeMap<i64, String>;

// ─── MemoryDatabase ───────────────────────────────────────────────────────────

/// In-process [`Database`] that forgets everything on exit.
#[derive(Default)]
pub struct MemoryDatabase {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every record of a table, ordered by key.
    pub fn records(&self, table: &str) -> Vec<Record> {
        self.tables
            .read()
            .get(table)
            .map(|rows| {
                rows.iter()
                    .map(|(uin, payload)| Record::new(*uin, payload.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn extend(&self, table: &str) -> StoreResult<()> {
        self.tables.write().entry(table.to_string()).or_default();
        Ok(())
    }

    async fn get(&self, table: &str, uin: i64) -> StoreResult<Option<Record>> {
        let tables = self.tables.read();
        let rows = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        Ok(rows.get(&uin).map(|payload| Record::new(uin, payload.clone())))
    }

    async fn create(&self, table: &str, record: Record) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        if rows.contains_key(&record.uin) {
            return Err(StoreError::Duplicate {
                table: table.to_string(),
                key: record.uin,
            });
        }
        rows.insert(record.uin, record.payload);
        Ok(())
    }
}

// ─── FileDatabase ─────────────────────────────────────────────────────────────

/// [`Database`] that keeps one JSON document per table in a directory.
///
/// Tables are read once on [`extend`](Database::extend) and written through on
/// every [`create`](Database::create).
pub struct FileDatabase {
    dir: PathBuf,
    tables: Mutex<HashMap<String, Table>>,
}

impl FileDatabase {
    /// Creates a database rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the directory holding the table files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }

    async fn load_table(&self, table: &str) -> StoreResult<Table> {
        let path = self.table_path(table);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), "Loaded table");
                Ok(serde_json::from_slice(&bytes)?)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Table::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_table(&self, table: &str, rows: &Table) -> StoreResult<()> {
        let path = self.table_path(table);
        let tmp = self.dir.join(format!("{table}.json.tmp"));
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(rows)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        trace!(path = %path.display(), rows = rows.len(), "Table written");
        Ok(())
    }
}

#[async_trait]
impl Database for FileDatabase {
    async fn extend(&self, table: &str) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.contains_key(table) {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let rows = self.load_table(table).await?;
        tables.insert(table.to_string(), rows);
        Ok(())
    }

    async fn get(&self, table: &str, uin: i64) -> StoreResult<Option<Record>> {
        let tables = self.tables.lock().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        Ok(rows.get(&uin).map(|payload| Record::new(uin, payload.clone())))
    }

    async fn create(&self, table: &str, record: Record) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        if rows.contains_key(&record.uin) {
            return Err(StoreError::Duplicate {
                table: table.to_string(),
                key: record.uin,
            });
        }

        let uin = record.uin;
        rows.insert(uin, record.payload);
        if let Err(e) = self.write_table(table, rows).await {
            rows.remove(&uin);
            return Err(e);
        }
        Ok(())
    }
}
