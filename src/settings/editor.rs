//! Options-page operations on the persisted settings and stats.
//!
//! Unlike the overlay path, explicit saves here surface store errors to the
//! caller. The in-memory copy keeps the edit even when the save fails.

use crate::clock::Clock;
use crate::domain::parse_user_input;
use crate::settings::model::{check_range, PAUSE_DURATION_RANGE, UNLOCK_DURATION_RANGE};
use crate::settings::transfer::{parse_import, ExportDocument};
use crate::settings::{Settings, Theme};
use crate::stats::{Stats, StatsRecorder};
use crate::store::{self, KeyValueStore, Scope, StoreChange, SETTINGS_KEY, STATS_KEY};
use crate::NudgeError;
use std::sync::Arc;
use tracing::{info, warn};

/// Editable copy of settings and stats backed by a store.
pub struct SettingsEditor {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    stats_recorder: StatsRecorder,
    settings: Settings,
    stats: Stats,
}

impl SettingsEditor {
    /// Load the current settings and stats.
    pub fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Result<Self, NudgeError> {
        let settings = store::load::<Settings>(store.as_ref(), Scope::Roaming, SETTINGS_KEY)?.clamped();
        let stats_recorder = StatsRecorder::new(store.clone());
        let stats = stats_recorder.current()?;
        Ok(Self {
            store,
            clock,
            stats_recorder,
            settings,
            stats,
        })
    }

    /// Settings as currently edited.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Counters as last seen.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Parse and add a user-typed domain or URL. Returns the stored form.
    ///
    /// # Errors
    /// * `InvalidDomain` / `DuplicateDomain` - nothing changes
    /// * `StoreIO` - the domain stays added in memory
    pub fn add_domain(&mut self, raw: &str) -> Result<String, NudgeError> {
        let domain = parse_user_input(raw)?;
        if !self.settings.blacklist.insert(&domain) {
            return Err(NudgeError::DuplicateDomain(domain));
        }
        self.save_settings()?;
        Ok(domain)
    }

    /// Remove a domain. Returns whether it was on the list.
    pub fn remove_domain(&mut self, domain: &str) -> Result<bool, NudgeError> {
        if !self.settings.blacklist.remove(domain) {
            return Ok(false);
        }
        self.save_settings()?;
        Ok(true)
    }

    /// Set the countdown length in seconds (5-30).
    pub fn set_pause_duration(&mut self, seconds: u32) -> Result<(), NudgeError> {
        check_range("pauseDuration", seconds, PAUSE_DURATION_RANGE)?;
        self.settings.pause_duration = seconds;
        self.save_settings()
    }

    /// Set the unlock length in minutes (1-60).
    pub fn set_unlock_duration(&mut self, minutes: u32) -> Result<(), NudgeError> {
        check_range("unlockDuration", minutes, UNLOCK_DURATION_RANGE)?;
        self.settings.unlock_duration = minutes;
        self.save_settings()
    }

    /// Set the theme preference.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), NudgeError> {
        self.settings.theme = theme;
        self.save_settings()
    }

    /// Zero both counters if the user confirmed.
    pub fn reset_stats(&mut self, confirmed: bool) -> Result<bool, NudgeError> {
        let reset = self.stats_recorder.reset(confirmed)?;
        if reset {
            self.stats = Stats::default();
        }
        Ok(reset)
    }

    /// Build the export document for the current state.
    pub fn export(&self) -> ExportDocument {
        ExportDocument::new(self.settings.clone(), self.stats.clone(), self.clock.as_ref())
    }

    /// Validate and apply an import document.
    ///
    /// A rejected document changes nothing. A document without `stats`
    /// leaves the counters untouched.
    pub fn import(&mut self, json: &str) -> Result<(), NudgeError> {
        let imported = parse_import(json)?;

        self.settings = imported.settings;
        if let Some(stats) = imported.stats {
            self.stats = stats;
            store::save(self.store.as_ref(), Scope::Roaming, STATS_KEY, &self.stats)?;
        }
        self.save_settings()?;

        info!(domains = self.settings.blacklist.len(), "settings imported");
        Ok(())
    }

    /// Keep the displayed counters current as pauses complete elsewhere.
    pub fn on_store_change(&mut self, change: &StoreChange) {
        if !change.is(Scope::Roaming, STATS_KEY) {
            return;
        }
        match store::decode::<Stats>(STATS_KEY, change.new_value.clone()) {
            Ok(stats) => self.stats = stats,
            Err(e) => warn!(error = %e, "ignoring malformed stats change"),
        }
    }

    fn save_settings(&self) -> Result<(), NudgeError> {
        store::save(self.store.as_ref(), Scope::Roaming, SETTINGS_KEY, &self.settings)
    }
}
