//! `SQLite`-backed key-value store.
//!
//! Entries live in a single `kv_entries` table. The connection sits behind a
//! mutex and every statement runs on the blocking thread pool so async
//! callers are never stalled on disk I/O.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, schema, KeyValueStore};
use crate::error::StorageError;

/// Key-value store persisted in a local `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    /// Path to the database file.
    path: PathBuf,
    /// Shared database connection.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    StorageError::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| StorageError::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL lets readers proceed while a write is in flight.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database, mostly useful for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::Task("database connection lock poisoned".to_string()))?;
            op(&guard)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let raw: Option<Option<Vec<u8>>> = conn
                .query_row(schema::SELECT_ENTRY, [&key], |row| {
                    Ok(row.get_ref(0)?.as_bytes().ok().map(<[u8]>::to_vec))
                })
                .optional()?;

            match raw {
                None => Ok(None),
                Some(Some(bytes)) => String::from_utf8(bytes).map(Some).map_err(|e| {
                    StorageError::CorruptValue {
                        key,
                        message: e.to_string(),
                    }
                }),
                Some(None) => Err(StorageError::CorruptValue {
                    key,
                    message: "value is not text".to_string(),
                }),
            }
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                schema::UPSERT_ENTRY,
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            debug!("Wrote entry {}", key);
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let affected = conn.execute(schema::DELETE_ENTRY, [&key])?;
            debug!("Removed entry {} ({} row(s))", key, affected);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteKeyValueStore {
        SqliteKeyValueStore::open_in_memory().expect("failed to create test store")
    }

    fn temp_db_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("parkrecall_{tag}_{}.db", std::process::id()))
    }

    fn cleanup(path: &Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = create_test_store();
        assert_eq!(store.get("PARKED_LOCATION").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = create_test_store();
        store.set("k", "v1").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v1".to_string()));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = create_test_store();
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = create_test_store();
        store.set("k", "v").await.unwrap();
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = create_test_store();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.remove("a").await.unwrap();
        assert_eq!(store.get("b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_non_utf8_value_reported_as_corrupt() {
        let store = create_test_store();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                schema::UPSERT_ENTRY,
                params!["PARKED_LOCATION", vec![0xff_u8, 0xfe, b'{'], "2026-10-18"],
            )
            .unwrap();

        let err = store.get("PARKED_LOCATION").await.unwrap_err();
        assert!(matches!(err, StorageError::CorruptValue { .. }));
    }

    #[test]
    fn test_in_memory_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
        assert_eq!(store.name(), "sqlite");
    }

    #[tokio::test]
    async fn test_file_based_persists_across_reopen() {
        let db_path = temp_db_path("reopen");
        cleanup(&db_path);

        {
            let store = SqliteKeyValueStore::open(&db_path).unwrap();
            store.set("k", "persisted").await.unwrap();
            assert_eq!(store.path(), db_path);
        }

        let store = SqliteKeyValueStore::open(&db_path).unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("persisted".to_string()));

        drop(store);
        cleanup(&db_path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("parkrecall_nested_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let nested_path = root.join("nested").join("kv.db");

        let store = SqliteKeyValueStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }
}
