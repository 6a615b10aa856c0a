//! Durable key-value persistence layer.
//!
//! # Responsibility
//! - Define the storage contract the note store persists through.
//! - Provide a SQLite-backed durable implementation and a volatile one.
//!
//! # Invariants
//! - `set` replaces the whole value for a key; there are no partial writes.
//! - A write rejected for quota leaves the previous value untouched.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type KvResult<T> = Result<T, KvError>;

/// Storage-layer failure.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Write would push the store past its configured byte quota.
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        limit_bytes: usize,
    },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                key,
                required_bytes,
                limit_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes needed, limit is {limit_bytes}"
            ),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key to string value storage, modelled on browser local storage.
pub trait KeyValueStore {
    /// Reads one value. Absent keys are `Ok(None)`.
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    /// Inserts or replaces one value.
    fn set(&mut self, key: &str, value: &str) -> KvResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }
}

/// Checks a pending write against an optional quota.
///
/// Usage is counted as key bytes plus value bytes across all entries.
pub(crate) fn check_quota(
    key: &str,
    value: &str,
    other_entries_bytes: usize,
    limit_bytes: Option<usize>,
) -> KvResult<()> {
    let Some(limit_bytes) = limit_bytes else {
        return Ok(());
    };
    let required_bytes = other_entries_bytes + key.len() + value.len();
    if required_bytes > limit_bytes {
        return Err(KvError::QuotaExceeded {
            key: key.to_string(),
            required_bytes,
            limit_bytes,
        });
    }
    Ok(())
}
