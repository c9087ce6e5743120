//! Store-backed session operations.
//!
//! Every mutation is a read-modify-write of the whole `sessions` document in
//! the local scope.

use crate::clock::Clock;
use crate::session::SessionState;
use crate::store::{self, KeyValueStore, Scope, SESSIONS_KEY};
use crate::NudgeError;
use std::sync::Arc;
use tracing::debug;

/// Session map persisted in a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Wrap a store and a clock.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Load the current session map (empty when never written).
    pub fn load(&self) -> Result<SessionState, NudgeError> {
        store::load(self.store.as_ref(), Scope::Local, SESSIONS_KEY)
    }

    /// Grant an unlock for `domain` and persist it.
    ///
    /// Returns the updated map so callers can apply it without a re-read.
    pub fn grant(&self, domain: &str, duration_minutes: u32) -> Result<SessionState, NudgeError> {
        let mut sessions = self.load()?;
        let expiry = sessions.grant(domain, duration_minutes, self.clock.now_millis());
        store::save(self.store.as_ref(), Scope::Local, SESSIONS_KEY, &sessions)?;
        debug!(domain, expiry, "unlock granted");
        Ok(sessions)
    }

    /// Remove expired unlocks, writing back only if something was removed.
    pub fn sweep_expired(&self) -> Result<usize, NudgeError> {
        let mut sessions = self.load()?;
        let removed = sessions.sweep_expired(self.clock.now_millis());
        if removed > 0 {
            store::save(self.store.as_ref(), Scope::Local, SESSIONS_KEY, &sessions)?;
        }
        Ok(removed)
    }
}
