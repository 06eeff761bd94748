//! `SQLite`-backed key-value storage.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::kv::KeyValueStore;
use super::migrations;
use crate::error::{Error, Result};

/// Durable [`KeyValueStore`] kept in a single `SQLite` file.
///
/// Survives restarts and may be shared by several processes pointed at the
/// same file; the last write to a key wins.
#[derive(Debug)]
pub struct SqliteKvStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Other processes (a watcher, a second editor) read the same file
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<KvStats> {
        let conn = self.conn()?;

        let total_keys: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;

        let last_write: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM kv ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_write = last_write
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(KvStats {
            total_keys,
            last_write,
            db_size_bytes,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.conn()?.execute(
            r"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, updated_at],
        )?;
        debug!("Wrote {} bytes under key {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let affected = self.conn()?.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }
}

/// Statistics about the key-value database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvStats {
    /// Number of keys stored.
    pub total_keys: i64,
    /// Time of the most recent write to any key.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteKvStore {
        SqliteKvStore::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        assert!(SqliteKvStore::open_in_memory().is_ok());
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        store.set("notes", "[\"a\"]").unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("[\"a\"]"));
    }

    #[test]
    fn test_set_overwrites() {
        let store = create_test_store();
        store.set("notes", "first").unwrap();
        store.set("notes", "second").unwrap();

        assert_eq!(store.get("notes").unwrap().as_deref(), Some("second"));
        assert_eq!(store.stats().unwrap().total_keys, 1);
    }

    #[test]
    fn test_get_missing() {
        let store = create_test_store();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.set("notes", "[]").unwrap();

        assert!(store.remove("notes").unwrap());
        assert!(!store.remove("notes").unwrap());
        assert_eq!(store.get("notes").unwrap(), None);
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.total_keys, 0);
        assert!(stats.last_write.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let store = create_test_store();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_keys, 2);
        assert!(stats.last_write.is_some());
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.db");

        {
            let store = SqliteKvStore::open(&path).unwrap();
            store.set("notes", "[\"kept\"]").unwrap();
        }

        let store = SqliteKvStore::open(&path).unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("[\"kept\"]"));
        assert!(store.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_two_handles_share_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");

        let writer = SqliteKvStore::open(&path).unwrap();
        let reader = SqliteKvStore::open(&path).unwrap();

        writer.set("notes", "[\"d\"]").unwrap();
        assert_eq!(reader.get("notes").unwrap().as_deref(), Some("[\"d\"]"));
    }
}
