//! Time-bounded unlock map.
//!
//! An entry is unlocked iff `now < expiry`. Expired entries may linger until
//! the next sweep but are never reported as unlocked.

use crate::domain::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Session data stored under the local-only `sessions` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    /// Normalized domain -> expiry instant in epoch milliseconds.
    pub unlocked_domains: BTreeMap<String, i64>,
}

impl SessionState {
    /// Create an empty session map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `domain` holds an unexpired unlock at `now_ms`.
    pub fn is_unlocked(&self, domain: &str, now_ms: i64) -> bool {
        self.expiry(domain).is_some_and(|expiry| now_ms < expiry)
    }

    /// Expiry instant recorded for `domain`, expired or not.
    pub fn expiry(&self, domain: &str) -> Option<i64> {
        self.unlocked_domains.get(&normalize(domain)).copied()
    }

    /// Unlock `domain` for `duration_minutes` from `now_ms`.
    ///
    /// Overwrites any previous entry; grants never stack. Returns the new expiry.
    pub fn grant(&mut self, domain: &str, duration_minutes: u32, now_ms: i64) -> i64 {
        let expiry = now_ms.saturating_add(i64::from(duration_minutes) * MILLIS_PER_MINUTE);
        self.unlocked_domains.insert(normalize(domain), expiry);
        expiry
    }

    /// Drop every entry whose expiry is `<= now_ms`.
    ///
    /// Idempotent. Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now_ms: i64) -> usize {
        let before = self.unlocked_domains.len();
        self.unlocked_domains.retain(|_, expiry| *expiry > now_ms);
        before - self.unlocked_domains.len()
    }
}
