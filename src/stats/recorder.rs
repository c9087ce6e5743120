//! Outcome counters for terminal pause decisions.
//!
//! Each completed pause increments exactly one counter. Only an explicit,
//! confirmed reset ever decreases them.

use crate::store::{self, KeyValueStore, Scope, STATS_KEY};
use crate::NudgeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Badge text shown above this count.
const BADGE_CAP: u64 = 99;

/// How a pause ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// User waited out the pause and went on to the site.
    Continue,
    /// User closed the tab or dismissed the pause.
    Abandon,
}

/// Usage statistics stored under the roaming `stats` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    /// Number of abandoned pauses.
    pub temptations_resisted: u64,

    /// Number of pauses that ended in "continue".
    pub intentional_visits: u64,
}

impl Stats {
    /// Count one terminal decision.
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Continue => {
                self.intentional_visits = self.intentional_visits.saturating_add(1);
            }
            Decision::Abandon => {
                self.temptations_resisted = self.temptations_resisted.saturating_add(1);
            }
        }
    }

    /// Text for the toolbar badge: empty at zero, capped at `99+`.
    pub fn badge_text(&self) -> String {
        match self.temptations_resisted {
            0 => String::new(),
            n if n > BADGE_CAP => format!("{}+", BADGE_CAP),
            n => n.to_string(),
        }
    }
}

/// Read-modify-write access to the persisted counters.
#[derive(Clone)]
pub struct StatsRecorder {
    store: Arc<dyn KeyValueStore>,
}

impl StatsRecorder {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current counters (zero when never written).
    pub fn current(&self) -> Result<Stats, NudgeError> {
        store::load(self.store.as_ref(), Scope::Roaming, STATS_KEY)
    }

    /// Increment the counter for `decision` and persist.
    pub fn record(&self, decision: Decision) -> Result<Stats, NudgeError> {
        let mut stats = self.current()?;
        stats.record(decision);
        store::save(self.store.as_ref(), Scope::Roaming, STATS_KEY, &stats)?;
        Ok(stats)
    }

    /// Zero both counters.
    ///
    /// Does nothing unless the user confirmed; returns whether a reset happened.
    pub fn reset(&self, confirmed: bool) -> Result<bool, NudgeError> {
        if !confirmed {
            return Ok(false);
        }
        store::save(self.store.as_ref(), Scope::Roaming, STATS_KEY, &Stats::default())?;
        info!("statistics reset");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_record_increments_one_counter() {
        let mut stats = Stats::default();
        stats.record(Decision::Continue);
        assert_eq!(stats.intentional_visits, 1);
        assert_eq!(stats.temptations_resisted, 0);

        stats.record(Decision::Abandon);
        stats.record(Decision::Abandon);
        assert_eq!(stats.intentional_visits, 1);
        assert_eq!(stats.temptations_resisted, 2);
    }

    #[test]
    fn test_record_saturates_at_max() {
        let mut stats = Stats {
            temptations_resisted: u64::MAX,
            intentional_visits: u64::MAX,
        };
        stats.record(Decision::Abandon);
        stats.record(Decision::Continue);
        assert_eq!(stats.temptations_resisted, u64::MAX);
        assert_eq!(stats.intentional_visits, u64::MAX);
    }

    #[test]
    fn test_badge_text() {
        let mut stats = Stats::default();
        assert_eq!(stats.badge_text(), "");
        stats.temptations_resisted = 7;
        assert_eq!(stats.badge_text(), "7");
        stats.temptations_resisted = 99;
        assert_eq!(stats.badge_text(), "99");
        stats.temptations_resisted = 100;
        assert_eq!(stats.badge_text(), "99+");
    }

    #[test]
    fn test_recorder_persists() {
        let store = Arc::new(MemoryStore::new());
        let recorder = StatsRecorder::new(store.clone());

        recorder.record(Decision::Abandon).unwrap();
        recorder.record(Decision::Continue).unwrap();

        let again = StatsRecorder::new(store);
        assert_eq!(
            again.current().unwrap(),
            Stats {
                temptations_resisted: 1,
                intentional_visits: 1
            }
        );
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let recorder = StatsRecorder::new(Arc::new(MemoryStore::new()));
        recorder.record(Decision::Abandon).unwrap();

        assert!(!recorder.reset(false).unwrap());
        assert_eq!(recorder.current().unwrap().temptations_resisted, 1);

        assert!(recorder.reset(true).unwrap());
        assert_eq!(recorder.current().unwrap(), Stats::default());
    }

    #[test]
    fn test_partial_stats_document() {
        let stats: Stats = serde_json::from_str(r#"{"intentionalVisits": 4}"#).unwrap();
        assert_eq!(stats.intentional_visits, 4);
        assert_eq!(stats.temptations_resisted, 0);
    }
}
