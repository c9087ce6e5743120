//! In-process store backend.

use crate::store::{KeyValueStore, Scope, StoreChange, CHANGE_CHANNEL_CAPACITY};
use crate::NudgeError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Store that keeps everything in memory.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(Scope, String), Value>>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>, NudgeError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| NudgeError::StoreIO("memory store lock poisoned".to_string()))?;
        Ok(entries.get(&(scope, key.to_string())).cloned())
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> Result<(), NudgeError> {
        {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| NudgeError::StoreIO("memory store lock poisoned".to_string()))?;
            entries.insert((scope, key.to_string()), value.clone());
        }

        // No subscribers is not an error.
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
