//! SQLite-backed key-value store for durable guest storage

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::Connection;

use crate::store::KeyValueStore;
use crate::{Error, Result};

/// Durable key-value store over a single `SQLite` connection
///
/// One connection behind a mutex is enough here: a controller is a single
/// logical actor and only ever touches its own two keys.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store, used by tests
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.lock();
        let result = conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            rusqlite::params![key, value],
        )
        .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_value() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("k1", b"hello").unwrap();
        assert_eq!(store.get("k1").unwrap().as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn get_missing_key_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get("absent").unwrap().is_none());
    }

    #[test]
    fn set_replaces_existing_value() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("k1", b"first").unwrap();
        store.set("k1", b"second").unwrap();
        assert_eq!(store.get("k1").unwrap().as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn delete_removes_value() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("k1", b"value").unwrap();
        store.delete("k1").unwrap();
        assert!(store.get("k1").unwrap().is_none());
    }

    #[test]
    fn delete_absent_key_is_ok() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.delete("never-set").unwrap();
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wishlist.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("k1", b"durable").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("k1").unwrap().as_deref(), Some(&b"durable"[..]));
    }
}
