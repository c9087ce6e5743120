//! Persistent key-value store abstraction.
//!
//! Two scopes mirror the host's storage areas: a small roaming scope for
//! settings and stats, and a local-only scope for the frequently rewritten
//! session map. Writers publish a [`StoreChange`] to every subscriber.

pub mod file;
pub mod memory;

use crate::NudgeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Roaming key holding [`Settings`](crate::settings::Settings).
pub const SETTINGS_KEY: &str = "settings";

/// Roaming key holding [`Stats`](crate::stats::Stats).
pub const STATS_KEY: &str = "stats";

/// Local key holding [`SessionState`](crate::session::SessionState).
pub const SESSIONS_KEY: &str = "sessions";

/// Capacity of the change-notification channel.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Storage area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Small, possibly synced across devices.
    Roaming,
    /// Larger, this device only.
    Local,
}

impl Scope {
    /// Stable lowercase name, used for directory names.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Roaming => "roaming",
            Scope::Local => "local",
        }
    }
}

/// Notification that a key was written.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    /// Area the key lives in.
    pub scope: Scope,
    /// Key that changed.
    pub key: String,
    /// Value after the write.
    pub new_value: Value,
}

impl StoreChange {
    /// Whether this change is for `key` in `scope`.
    pub fn is(&self, scope: Scope, key: &str) -> bool {
        self.scope == scope && self.key == key
    }
}

/// Key-value store with change notifications.
///
/// Concurrent writers are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. `Ok(None)` when it was never written.
    fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>, NudgeError>;

    /// Write a key and notify subscribers.
    fn set(&self, scope: Scope, key: &str, value: Value) -> Result<(), NudgeError>;

    /// Subscribe to changes made after this call.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Read and decode a typed value, falling back to `T::default()` when absent.
pub fn load<T>(store: &dyn KeyValueStore, scope: Scope, key: &str) -> Result<T, NudgeError>
where
    T: DeserializeOwned + Default,
{
    match store.get(scope, key)? {
        Some(value) => decode(key, value),
        None => Ok(T::default()),
    }
}

/// Encode and write a typed value.
pub fn save<T>(store: &dyn KeyValueStore, scope: Scope, key: &str, value: &T) -> Result<(), NudgeError>
where
    T: Serialize,
{
    let value = serde_json::to_value(value)
        .map_err(|e| NudgeError::Serialization(format!("Failed to encode {}: {}", key, e)))?;
    store.set(scope, key, value)
}

/// Decode a raw value read from, or notified by, the store.
pub fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, NudgeError> {
    serde_json::from_value(value)
        .map_err(|e| NudgeError::Serialization(format!("Failed to decode {}: {}", key, e)))
}
