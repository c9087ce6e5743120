//! Background worker - the privileged, per-browser context.
//!
//! Owns first-install defaults, the close-tab request from pages, the
//! periodic session sweep and the toolbar badge. Every failure here is
//! logged and swallowed; none of these paths has a caller to report to.

use crate::clock::{Clock, SystemClock};
use crate::protocol::{RuntimeMessage, TabId};
use crate::session::{SessionState, SessionStore};
use crate::settings::Settings;
use crate::stats::{Stats, StatsRecorder};
use crate::store::{self, KeyValueStore, Scope, StoreChange, SESSIONS_KEY, SETTINGS_KEY, STATS_KEY};
use crate::NudgeError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the recurring alarm that sweeps expired unlocks.
pub const CLEANUP_ALARM: &str = "cleanup-sessions";

/// Why the extension lifecycle hook fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    /// First install.
    Install,
    /// Version update; existing data is kept.
    Update,
}

/// Browser capabilities the worker needs.
pub trait Shell: Send + Sync {
    /// Close a tab.
    fn close_tab(&self, tab: TabId) -> Result<(), NudgeError>;

    /// Set the toolbar badge. Empty text hides it.
    fn set_badge_text(&self, text: &str);
}

/// Background context handlers.
pub struct BackgroundWorker {
    store: Arc<dyn KeyValueStore>,
    shell: Arc<dyn Shell>,
    sessions: SessionStore,
    stats: StatsRecorder,
}

impl BackgroundWorker {
    /// Create a worker using the system clock.
    pub fn new(store: Arc<dyn KeyValueStore>, shell: Arc<dyn Shell>) -> Self {
        Self::with_clock(store, shell, Arc::new(SystemClock))
    }

    /// Create a worker with a custom clock.
    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        shell: Arc<dyn Shell>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sessions = SessionStore::new(store.clone(), clock);
        let stats = StatsRecorder::new(store.clone());
        Self {
            store,
            shell,
            sessions,
            stats,
        }
    }

    /// Lifecycle hook. On first install, writes default settings, zeroed
    /// counters and an empty session map.
    pub fn on_install(&self, reason: InstallReason) -> Result<(), NudgeError> {
        if reason != InstallReason::Install {
            debug!(?reason, "keeping existing data");
            return Ok(());
        }

        store::save(self.store.as_ref(), Scope::Roaming, SETTINGS_KEY, &Settings::default())?;
        store::save(self.store.as_ref(), Scope::Roaming, STATS_KEY, &Stats::default())?;
        store::save(self.store.as_ref(), Scope::Local, SESSIONS_KEY, &SessionState::default())?;
        info!("default settings installed");
        Ok(())
    }

    /// Browser start: show the current counter.
    pub fn on_startup(&self) {
        self.refresh_badge();
    }

    /// Handle a message from a page. Returns whether it was acted on.
    ///
    /// Messages without a sender tab are ignored.
    pub fn handle_message(&self, message: RuntimeMessage, sender: Option<TabId>) -> bool {
        let Some(tab) = sender else {
            debug!(?message, "message without sender tab, ignoring");
            return false;
        };

        match message {
            RuntimeMessage::CloseTab => {
                if let Err(e) = self.shell.close_tab(tab) {
                    warn!(tab = tab.0, error = %e, "failed to close tab");
                    return false;
                }
                true
            }
        }
    }

    /// Named alarm fired. Only [`CLEANUP_ALARM`] is handled.
    pub fn on_alarm(&self, name: &str) {
        if name != CLEANUP_ALARM {
            return;
        }
        self.sweep();
    }

    /// Remove expired unlocks. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        match self.sessions.sweep_expired() {
            Ok(removed) => {
                if removed > 0 {
                    debug!(removed, "expired unlocks swept");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "session sweep failed");
                0
            }
        }
    }

    /// React to a store change: a counter change refreshes the badge.
    pub fn on_store_change(&self, change: &StoreChange) {
        if !change.is(Scope::Roaming, STATS_KEY) {
            return;
        }
        match store::decode::<Stats>(STATS_KEY, change.new_value.clone()) {
            Ok(stats) => self.shell.set_badge_text(&stats.badge_text()),
            Err(e) => warn!(error = %e, "ignoring malformed stats change"),
        }
    }

    /// Read the counters and update the badge.
    pub fn refresh_badge(&self) {
        match self.stats.current() {
            Ok(stats) => self.shell.set_badge_text(&stats.badge_text()),
            Err(e) => warn!(error = %e, "failed to read stats for badge"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::stats::Decision;
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingShell {
        closed: Mutex<Vec<TabId>>,
        badge: Mutex<Option<String>>,
        fail_close: bool,
    }

    impl Shell for RecordingShell {
        fn close_tab(&self, tab: TabId) -> Result<(), NudgeError> {
            if self.fail_close {
                return Err(NudgeError::StoreIO("tab already gone".to_string()));
            }
            self.closed.lock().unwrap().push(tab);
            Ok(())
        }

        fn set_badge_text(&self, text: &str) {
            *self.badge.lock().unwrap() = Some(text.to_string());
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<MockClock>,
        shell: Arc<RecordingShell>,
        worker: BackgroundWorker,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::from_rfc3339("2025-01-15T12:00:00Z"));
        let shell = Arc::new(RecordingShell::default());
        let worker = BackgroundWorker::with_clock(store.clone(), shell.clone(), clock.clone());
        Fixture {
            store,
            clock,
            shell,
            worker,
        }
    }

    #[test]
    fn test_install_writes_defaults() {
        let f = fixture();
        f.worker.on_install(InstallReason::Install).unwrap();

        let settings: Settings = store::load(&*f.store, Scope::Roaming, SETTINGS_KEY).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(f.store.get(Scope::Roaming, STATS_KEY).unwrap().is_some());
        assert!(f.store.get(Scope::Local, SESSIONS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_update_keeps_data() {
        let f = fixture();
        f.worker.on_install(InstallReason::Update).unwrap();
        assert!(f.store.get(Scope::Roaming, SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_close_tab_needs_sender() {
        let f = fixture();
        assert!(!f.worker.handle_message(RuntimeMessage::CloseTab, None));
        assert!(f.worker.handle_message(RuntimeMessage::CloseTab, Some(TabId(7))));
        assert_eq!(*f.shell.closed.lock().unwrap(), vec![TabId(7)]);
    }

    #[test]
    fn test_close_tab_failure_swallowed() {
        let store = Arc::new(MemoryStore::new());
        let shell = Arc::new(RecordingShell {
            fail_close: true,
            ..Default::default()
        });
        let worker = BackgroundWorker::new(store, shell);
        assert!(!worker.handle_message(RuntimeMessage::CloseTab, Some(TabId(1))));
    }

    #[test]
    fn test_cleanup_alarm_sweeps() {
        let f = fixture();
        let sessions = SessionStore::new(f.store.clone(), f.clock.clone());
        sessions.grant("reddit.com", 1).unwrap();
        sessions.grant("x.com", 30).unwrap();

        f.worker.on_alarm("something-else");
        assert_eq!(sessions.load().unwrap().unlocked_domains.len(), 2);

        f.clock.advance(chrono::Duration::minutes(1));
        f.worker.on_alarm(CLEANUP_ALARM);
        let remaining = sessions.load().unwrap();
        assert_eq!(remaining.unlocked_domains.len(), 1);
        assert!(remaining.unlocked_domains.contains_key("x.com"));
    }

    #[test]
    fn test_sweep_without_expired_does_not_write() {
        let f = fixture();
        let mut changes = f.store.subscribe();
        assert_eq!(f.worker.sweep(), 0);
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_badge_follows_stats() {
        let f = fixture();
        f.worker.on_startup();
        assert_eq!(f.shell.badge.lock().unwrap().as_deref(), Some(""));

        let mut changes = f.store.subscribe();
        StatsRecorder::new(f.store.clone()).record(Decision::Abandon).unwrap();
        f.worker.on_store_change(&changes.try_recv().unwrap());
        assert_eq!(f.shell.badge.lock().unwrap().as_deref(), Some("1"));
    }
}
