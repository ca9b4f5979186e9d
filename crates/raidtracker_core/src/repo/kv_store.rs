//! Key-value persistence adapters.
//!
//! # Responsibility
//! - Define the load/save-by-key contract the record store writes through.
//! - Provide a SQLite-backed adapter and an in-process adapter.
//!
//! # Invariants
//! - `set` replaces the whole value for a key; there are no partial writes.
//! - `get` after a successful `set` observes the written value.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

/// Persistence adapter failure.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Failure reported by a non-SQLite adapter.
    Backend(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "key-value backend error: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Backend(_) => None,
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

/// Durable string store addressed by string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> KvResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }
}

/// SQLite-backed adapter over the `kv_entries` table.
///
/// The connection must come from `open_db`/`open_db_in_memory` so the
/// table exists.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
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

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        debug!(
            "event=kv_set module=repo status=ok key={key} bytes={}",
            value.len()
        );
        Ok(())
    }
}

/// In-process adapter. Nothing survives the value being dropped.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an adapter with existing entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
