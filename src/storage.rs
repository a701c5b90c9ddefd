use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::StorageError;
use crate::models::{PersistedState, SavedProgress};

/// Slot the progress blob lives under.
pub const STORAGE_KEY: &str = "ddd-learning-progress";

/// Persistence capability for the tracker.
pub trait ProgressStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SavedProgress>, StorageError>;
    fn save(&mut self, state: &PersistedState) -> Result<(), StorageError>;
}

pub fn encode(state: &PersistedState) -> Result<String, StorageError> {
    Ok(serde_json::to_string(state)?)
}

/// Only a blob that is not JSON at all is an error; individual bad fields
/// are dropped by `SavedProgress::from_value`.
pub fn decode(raw: &str) -> Result<SavedProgress, StorageError> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(SavedProgress::from_value(&value))
}

// Key/value slots in a SQLite file, one row per key
pub struct SqliteStore {
    conn: Connection,
    key: String,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            StorageError::Unavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        let store = Self {
            conn,
            key: STORAGE_KEY.to_string(),
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    pub fn read_raw(&self) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn write_raw(&self, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![self.key, value],
        )?;
        Ok(())
    }
}

impl ProgressStore for SqliteStore {
    fn load(&self) -> Result<Option<SavedProgress>, StorageError> {
        match self.read_raw()? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), StorageError> {
        let raw = encode(state)?;
        self.write_raw(&raw)
    }
}

/// Shared in-memory slot. Clones see the same data, so a test can keep a
/// handle after giving one to the tracker.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: std::rc::Rc<std::cell::RefCell<Option<String>>>,
    unavailable: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: &str) -> Self {
        let store = Self::default();
        store.slot.replace(Some(raw.to_string()));
        store
    }

    /// Every operation fails, like storage disabled by the environment.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("storage is disabled".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<SavedProgress>, StorageError> {
        self.check()?;
        match self.slot.borrow().as_deref() {
            Some(raw) => decode(raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), StorageError> {
        self.check()?;
        let raw = encode(state)?;
        self.slot.replace(Some(raw));
        Ok(())
    }
}
