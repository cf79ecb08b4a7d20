//! Durable key-value store using rusqlite.

use super::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use super::{KeyValueStore, StorageError};
use crate::lock;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed store, one row per key.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), StorageError> {
        let conn = lock(&self.conn);

        conn.execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let current_version = Self::schema_version(&conn)?;
        if current_version < CURRENT_VERSION {
            conn.execute_batch(SCHEMA)
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                [CURRENT_VERSION],
            )
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

            tracing::info!("Preference database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    fn schema_version(conn: &Connection) -> Result<i32, StorageError> {
        let result: SqliteResult<i32> = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        lock(&self.conn)
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.conn)
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map(|_| ())
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.conn)
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map(|_| ())
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let conn = lock(&self.conn);
        let mut stmt = conn
            .prepare("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let keys = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .collect::<SqliteResult<Vec<String>>>()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(keys)
    }
}
