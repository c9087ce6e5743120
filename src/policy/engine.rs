//! The pause decision.
//!
//! `should_pause(d) = blacklisted(normalize(d)) && !unlocked(key(d))`, evaluated
//! against the engine's current snapshots of settings and sessions. Snapshots
//! are replaced whenever the store reports a change. A snapshot that could not
//! be loaded is treated as "allow": this engine never blocks on missing data.

use crate::clock::Clock;
use crate::config::UnlockScope;
use crate::domain::normalize;
use crate::policy::matcher::matching_entry;
use crate::session::SessionState;
use crate::settings::Settings;
use std::sync::Arc;

/// Composes normalization, matching and session lookup.
pub struct PolicyEngine {
    clock: Arc<dyn Clock>,
    unlock_scope: UnlockScope,
    settings: Option<Settings>,
    sessions: Option<SessionState>,
}

impl PolicyEngine {
    /// Create an engine with no settings or sessions yet. It never pauses
    /// until both are applied.
    pub fn new(clock: Arc<dyn Clock>, unlock_scope: UnlockScope) -> Self {
        Self {
            clock,
            unlock_scope,
            settings: None,
            sessions: None,
        }
    }

    /// Create an engine from explicit snapshots.
    pub fn with_state(
        clock: Arc<dyn Clock>,
        unlock_scope: UnlockScope,
        settings: Settings,
        sessions: SessionState,
    ) -> Self {
        Self {
            clock,
            unlock_scope,
            settings: Some(settings),
            sessions: Some(sessions),
        }
    }

    /// Replace the settings snapshot.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = Some(settings);
    }

    /// Replace the sessions snapshot.
    pub fn apply_sessions(&mut self, sessions: SessionState) {
        self.sessions = Some(sessions);
    }

    /// Current settings snapshot, if loaded.
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// Current sessions snapshot, if loaded.
    pub fn sessions(&self) -> Option<&SessionState> {
        self.sessions.as_ref()
    }

    /// Whether a non-empty blacklist is loaded.
    pub fn has_blacklist(&self) -> bool {
        self.settings
            .as_ref()
            .is_some_and(|s| !s.blacklist.is_empty())
    }

    /// Session key an unlock for `domain` is stored under.
    ///
    /// With [`UnlockScope::MatchedEntry`] this is the matching blacklist
    /// entry; otherwise (or when nothing matches) the normalized host.
    pub fn unlock_key(&self, domain: &str) -> String {
        let domain = normalize(domain);
        match (self.unlock_scope, self.settings.as_ref()) {
            (UnlockScope::MatchedEntry, Some(settings)) => {
                matching_entry(&domain, &settings.blacklist).unwrap_or(domain)
            }
            _ => domain,
        }
    }

    /// Record an unlock in the local snapshot.
    ///
    /// Lets this context stop pausing even when persisting the grant failed.
    pub fn note_grant(&mut self, key: &str, duration_minutes: u32) {
        let now = self.clock.now_millis();
        self.sessions
            .get_or_insert_with(SessionState::new)
            .grant(key, duration_minutes, now);
    }

    /// Decide whether visiting `domain` requires a pause right now.
    pub fn should_pause(&self, domain: &str) -> bool {
        let Some(settings) = self.settings.as_ref() else {
            return false;
        };
        if settings.blacklist.is_empty() {
            return false;
        }

        let domain = normalize(domain);
        let Some(entry) = matching_entry(&domain, &settings.blacklist) else {
            return false;
        };

        let Some(sessions) = self.sessions.as_ref() else {
            return false;
        };

        let key = match self.unlock_scope {
            UnlockScope::VisitedHost => domain,
            UnlockScope::MatchedEntry => entry,
        };
        !sessions.is_unlocked(&key, self.clock.now_millis())
    }
}
