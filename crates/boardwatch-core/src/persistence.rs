//! Durable storage of the board selection and activity filter
//!
//! Backends are fallible ([`KeyValueStore`]); the [`PersistenceAdapter`] in
//! front of them is not. Any backend failure is logged and degrades to
//! "absent" on read and "no-op" on write, so the rest of the core never sees
//! a storage error.

use crate::error::PersistenceError;
use crate::models::{is_reserved_board_id, ActivityFilter, BoardId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key holding the ordered selection as a JSON array of strings
pub const SELECTED_BOARDS_KEY: &str = "boardwatch-selected-boards";

/// Key holding the activity filter as plain text
pub const ACTIVITY_FILTER_KEY: &str = "boardwatch-activity-filter";

/// Fallible key/value backend
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// One UTF-8 file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let write_err = |source: std::io::Error| PersistenceError::Write {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        std::fs::write(self.path_for(key), value).map_err(write_err)
    }
}

/// In-memory backend, used for ephemeral sessions and as the test fake
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Infallible read/write contract over a [`KeyValueStore`]
#[derive(Clone)]
pub struct PersistenceAdapter {
    backend: Arc<dyn KeyValueStore>,
}

impl PersistenceAdapter {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Adapter over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Adapter over a [`FileStore`] rooted at `dir`
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(dir)))
    }

    /// Read a raw value. Backend failures read as absent.
    pub fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                report(&e);
                None
            }
        }
    }

    /// Write a raw value. Backend failures are a logged no-op.
    pub fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            report(&e);
        }
    }

    /// Load the persisted selection (empty when absent or corrupt)
    pub fn load_selection(&self) -> Vec<BoardId> {
        let Some(raw) = self.read(SELECTED_BOARDS_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<BoardId>>(&raw) {
            Ok(ids) => ids
                .into_iter()
                .filter(|id| {
                    let reserved = is_reserved_board_id(id);
                    if reserved {
                        warn!(board = %id, "Dropping reserved id from persisted selection");
                    }
                    !reserved
                })
                .collect(),
            Err(source) => {
                report(&PersistenceError::Corrupt {
                    key: SELECTED_BOARDS_KEY.to_string(),
                    source,
                });
                Vec::new()
            }
        }
    }

    pub fn save_selection(&self, ids: &[BoardId]) {
        match serde_json::to_string(ids) {
            Ok(json) => self.write(SELECTED_BOARDS_KEY, &json),
            Err(source) => report(&PersistenceError::Corrupt {
                key: SELECTED_BOARDS_KEY.to_string(),
                source,
            }),
        }
    }

    /// Load the persisted filter (`All` when absent)
    pub fn load_filter(&self) -> ActivityFilter {
        self.read(ACTIVITY_FILTER_KEY)
            .map(|raw| raw.parse::<ActivityFilter>().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn save_filter(&self, filter: &ActivityFilter) {
        self.write(ACTIVITY_FILTER_KEY, filter.as_str());
    }
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter").finish_non_exhaustive()
    }
}

/// Diagnostic side channel for swallowed storage failures
fn report(error: &PersistenceError) {
    match error {
        PersistenceError::Corrupt { key, source } => {
            warn!(key = %key, error = %source, "Discarding corrupt persisted value");
        }
        other => {
            warn!(key = ?other.key(), error = %other, "Persistent storage failure, continuing without it");
        }
    }
    debug!(?error, "Persistence error detail");
}
