//! Key-value storage capability and its backends.
//!
//! The parking session store only needs get/set/remove over string values.
//! This module defines that capability as [`KeyValueStore`] and provides
//! three implementations:
//!
//! - [`SqliteKeyValueStore`]: a table in a local `SQLite` database (default)
//! - [`FileKeyValueStore`]: one file per key, written atomically
//! - [`MemoryKeyValueStore`]: an in-process map

pub mod file;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{BackendKind, Config};
use crate::error::StorageError;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

/// Asynchronous string key-value storage.
///
/// Each individual `set` and `remove` must be atomic: a concurrent `get`
/// sees either the old value or the new one, never a mix. Writes are not
/// queued against each other; the last one to complete wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptValue`] if a value is present but is
    /// not valid text, or another error if the backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Open the backend selected by the configuration.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened.
pub fn open_backend(config: &Config) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let backend: Arc<dyn KeyValueStore> = match config.storage.backend {
        BackendKind::Sqlite => Arc::new(SqliteKeyValueStore::open(config.database_path())?),
        BackendKind::File => Arc::new(FileKeyValueStore::new(config.data_dir())),
        BackendKind::Memory => Arc::new(MemoryKeyValueStore::new()),
    };
    debug!(backend = backend.name(), "Storage backend ready");
    Ok(backend)
}
