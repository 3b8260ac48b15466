// SPDX-License-Identifier: GPL-3.0-only

//! Key-value persistence for panel geometry.
//!
//! The panel manager reads one [`PersistedRecord`] at start-up and replaces it
//! after every stable geometry change. Stores are keyed by window identifier so
//! that more than one panel can share a backend.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: shared in-process map of JSON text, used by tests and
//!   hosts that bridge to their own storage.
//! - [`JsonFileStore`]: one JSON file per key in a directory.
//! - [`BackgroundStore`]: moves writes of any other store onto a Tokio task
//!   so the gesture path never blocks on storage.

mod background;
mod file;

pub use background::BackgroundStore;
pub use file::JsonFileStore;

use crate::state::PersistedRecord;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Storage backend for persisted panel geometry.
pub trait PersistenceStore {
    /// Read the record stored under `key`.
    ///
    /// A missing record is `Ok(None)`; unreadable or malformed data is an error.
    fn load(&self, key: &str) -> Result<Option<PersistedRecord>, StoreError>;

    /// Replace the record stored under `key`.
    fn save(&self, key: &str, record: &PersistedRecord) -> Result<(), StoreError>;
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing persisted geometry.
#[derive(Debug)]
pub enum StoreError {
    /// The backing medium could not be read or written.
    Io(std::io::Error),
    /// A stored record exists but is not a valid geometry record.
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    /// A record could not be encoded.
    Serialize(serde_json::Error),
    /// The background writer is no longer running.
    Closed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store I/O failed: {}", err),
            StoreError::Corrupt { key, source } => {
                write!(f, "stored record '{}' is corrupt: {}", key, source)
            }
            StoreError::Serialize(err) => write!(f, "record could not be encoded: {}", err),
            StoreError::Closed => write!(f, "background writer has stopped"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Corrupt { source, .. } => Some(source),
            StoreError::Serialize(err) => Some(err),
            StoreError::Closed => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

pub(crate) fn decode_record(key: &str, text: &str) -> StoreResult<PersistedRecord> {
    serde_json::from_str(text).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn encode_record(record: &PersistedRecord) -> StoreResult<String> {
    serde_json::to_string(record).map_err(StoreError::Serialize)
}

/// In-memory store holding the raw JSON text of each record.
///
/// Clones share the same map, so a second manager built over a clone sees what
/// the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store arbitrary text under `key`, bypassing encoding.
    pub fn insert_raw(&self, key: &str, text: impl Into<String>) {
        self.lock().insert(key.to_string(), text.into());
    }

    /// Raw text currently stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.lock().remove(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<PersistedRecord>> {
        match self.raw(key) {
            Some(text) => decode_record(key, &text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, record: &PersistedRecord) -> StoreResult<()> {
        let text = encode_record(record)?;
        self.lock().insert(key.to_string(), text);
        Ok(())
    }
}
