// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persistent key-value storage for user preferences
//!
//! Mirrors a browser-style local store: string keys, JSON-encoded values.
//! The typed helpers (`get_item`, `set_item`, ...) never fail. A broken
//! backend is logged and the caller's default is used instead.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

/// Key under which the chosen UI language is persisted.
pub const LANGUAGE_KEY: &str = "language";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Backend capability: get/set/remove/clear by string key.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Filesystem,
    Memory,
}

impl StorageMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "filesystem" | "disk" | "local" | "file" => Some(StorageMode::Filesystem),
            "memory" | "mem" | "ephemeral" => Some(StorageMode::Memory),
            _ => None,
        }
    }
}

/// Open a store for the given mode. `path` is only used by the filesystem backend.
pub fn open_store(mode: StorageMode, path: &Path) -> Box<dyn KeyValueStore> {
    match mode {
        StorageMode::Filesystem => Box::new(FileStore::new(path)),
        StorageMode::Memory => Box::new(MemoryStore::default()),
    }
}

/// In-process store. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

/// A single JSON object file holding every entry.
///
/// The file is read on every access so two handles on the same path (an
/// old and a "reloaded" process) observe each other's writes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, payload).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        if self.path.exists() {
            self.write_all(&BTreeMap::new())?;
        }
        Ok(())
    }
}

/// Read and decode `key`, returning `default` when absent or unreadable.
pub fn get_item<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(err) => {
            error!(key, %err, "error reading from storage");
            return default;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            error!(key, %err, "error decoding stored value");
            default
        }
    }
}

/// Encode and write `value` under `key`. Failures are logged, not returned.
pub fn set_item<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            error!(key, %err, "error encoding value for storage");
            return;
        }
    };
    if let Err(err) = store.set(key, &encoded) {
        error!(key, %err, "error saving to storage");
    }
}

pub fn remove_item(store: &mut dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        error!(key, %err, "error removing from storage");
    }
}

pub fn clear_items(store: &mut dyn KeyValueStore) {
    if let Err(err) = store.clear() {
        error!(%err, "error clearing storage");
    }
}
