//! File-based store backend with atomic writes.
//!
//! Stores one JSON document per key under `dirs::data_dir()/<namespace>/<scope>/`.
//! Uses temp file + rename for atomic writes.

use crate::store::{KeyValueStore, Scope, StoreChange, CHANGE_CHANNEL_CAPACITY};
use crate::NudgeError;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::debug;

/// File-based store backend.
#[derive(Debug)]
pub struct FileStore {
    /// Root directory; scopes are subdirectories.
    root: PathBuf,
    changes: broadcast::Sender<StoreChange>,
}

impl FileStore {
    /// Create a new file store with the given namespace.
    ///
    /// Files are stored under `dirs::data_dir()/<namespace>/`.
    pub fn new(namespace: &str) -> Result<Self, NudgeError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| NudgeError::StoreIO("Could not find data directory".to_string()))?;

        Self::with_path(base_dir.join(namespace))
    }

    /// Create a file store rooted at a specific path.
    pub fn with_path(root: PathBuf) -> Result<Self, NudgeError> {
        for scope in [Scope::Roaming, Scope::Local] {
            fs::create_dir_all(root.join(scope.as_str()))
                .map_err(|e| NudgeError::StoreIO(format!("Failed to create store dir: {}", e)))?;
        }

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self { root, changes })
    }

    /// Get the path for a key's file.
    fn key_path(&self, scope: Scope, key: &str) -> PathBuf {
        self.root.join(scope.as_str()).join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>, NudgeError> {
        let path = self.key_path(scope, key);

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| NudgeError::StoreIO(format!("Failed to read {}: {}", key, e)))?;

        let value = serde_json::from_str(&json)
            .map_err(|e| NudgeError::Serialization(format!("Failed to parse {}: {}", key, e)))?;
        Ok(Some(value))
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> Result<(), NudgeError> {
        let target_path = self.key_path(scope, key);
        let temp_path = target_path.with_extension("tmp");

        let json = serde_json::to_string_pretty(&value)
            .map_err(|e| NudgeError::Serialization(format!("Failed to encode {}: {}", key, e)))?;

        // Write to temp file
        fs::write(&temp_path, &json)
            .map_err(|e| NudgeError::StoreIO(format!("Failed to write temp file: {}", e)))?;

        // Atomic rename
        fs::rename(&temp_path, &target_path)
            .map_err(|e| NudgeError::StoreIO(format!("Failed to rename store file: {}", e)))?;

        debug!(scope = scope.as_str(), key, "store key written");

        let _ = self.changes.send(StoreChange {
            scope,
            key: key.to_string(),
            new_value: value,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
