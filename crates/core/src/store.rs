//! Key-value persistence for documents and preferences.
//!
//! The store itself is assumed reliable; only record shapes are defined by
//! this crate. `MemoryStore` backs tests and hosts with their own storage,
//! `FileStore` keeps one JSON file per key in a directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::scheduler::Debouncer;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid key {0:?}")]
    InvalidKey(String),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

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

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Debounced writer: bursts of edits collapse into one write, issued once
/// the delay has passed since the last edit. Last write wins.
#[derive(Debug, Clone)]
pub struct AutoSaver {
    key: String,
    debounce: Debouncer,
}

impl AutoSaver {
    pub fn new(key: impl Into<String>, delay: Duration) -> Self {
        Self {
            key: key.into(),
            debounce: Debouncer::new(delay),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record a mutation at `now`.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.debounce.trigger(now);
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Forget a pending write, e.g. because the caller just saved.
    pub fn cancel(&mut self) {
        self.debounce.flush();
    }

    /// Write `snapshot()` if the debounce window elapsed. Returns whether a
    /// write happened.
    pub fn poll(
        &mut self,
        now: Instant,
        store: &mut dyn KeyValueStore,
        snapshot: impl FnOnce() -> Result<String, StoreError>,
    ) -> Result<bool, StoreError> {
        if !self.debounce.fire_if_due(now) {
            return Ok(false);
        }
        self.write(store, snapshot)
    }

    /// Write immediately if anything is pending.
    pub fn flush(
        &mut self,
        store: &mut dyn KeyValueStore,
        snapshot: impl FnOnce() -> Result<String, StoreError>,
    ) -> Result<bool, StoreError> {
        if !self.debounce.flush() {
            return Ok(false);
        }
        self.write(store, snapshot)
    }

    fn write(
        &self,
        store: &mut dyn KeyValueStore,
        snapshot: impl FnOnce() -> Result<String, StoreError>,
    ) -> Result<bool, StoreError> {
        let body = snapshot()?;
        store.set(&self.key, &body)?;
        tracing::debug!(key = %self.key, bytes = body.len(), "auto-saved");
        Ok(true)
    }
}
