//! Storage module: the key-value persistence port and its implementations.
//!
//! Every piece of persisted state (flags, profiles, backups, the active
//! profile) lives under its own key. Two implementations are provided:
//! [`SqliteStore`] for durable storage and [`MemoryStore`] for tests and as the
//! session fallback when durable storage cannot be opened.

pub mod config;
pub mod memory;
pub mod schema;
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub use config::{AppConfig, ConfigError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage errors.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Key-value persistence port.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys starting with `prefix`, sorted.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Whether values survive a restart.
    fn is_durable(&self) -> bool {
        true
    }
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Open the SQLite store at `path`, falling back to an in-memory store for
/// the session if it cannot be opened.
///
/// The error that caused the fallback is returned alongside the store.
pub fn open_with_fallback(path: &Path) -> (SharedStore, Option<StorageError>) {
    match SqliteStore::open(path) {
        Ok(store) => {
            tracing::info!("Opened preference store at {}", path.display());
            (Arc::new(store), None)
        }
        Err(e) => {
            tracing::warn!(
                "Preference store at {} unavailable ({}), keeping preferences in memory for this session",
                path.display(),
                e
            );
            (Arc::new(MemoryStore::new()), Some(e))
        }
    }
}
