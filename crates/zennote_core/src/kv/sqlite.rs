//! SQLite-backed durable key-value store.
//!
//! # Invariants
//! - All reads and writes go through the migrated `kv_entries` table.
//! - Quota usage is measured in bytes, matching `MemoryKvStore`.

use super::{check_quota, KeyValueStore, KvResult};
use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const KV_TABLE: &str = "kv_entries";

/// Durable key-value store over one SQLite connection.
pub struct SqliteKvStore {
    conn: Connection,
    quota_bytes: Option<usize>,
}

impl SqliteKvStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a fresh migrated in-memory database.
    pub fn open_in_memory() -> KvResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a connection that was opened through `open_db*`.
    ///
    /// # Errors
    /// - `DbError::MissingRequiredTable` when migrations were not applied.
    pub fn try_new(conn: Connection) -> KvResult<Self> {
        ensure_kv_table(&conn)?;
        Ok(Self {
            conn,
            quota_bytes: None,
        })
    }

    /// Caps total key plus value bytes; `None` removes the cap.
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    fn bytes_excluding(&self, key: &str) -> KvResult<usize> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM kv_entries
             WHERE key <> ?1;",
            [key],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(used).unwrap_or(0))
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        if self.quota_bytes.is_some() {
            check_quota(key, value, self.bytes_excluding(key)?, self.quota_bytes)?;
        }

        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn ensure_kv_table(conn: &Connection) -> KvResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [KV_TABLE],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(DbError::MissingRequiredTable(KV_TABLE).into())
    }
}
