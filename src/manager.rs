//! Nudge Manager - the per-page entry point.
//!
//! The `NudgeManager` owns one page context's view of the world:
//! - Policy evaluation against settings and session snapshots
//! - The single live overlay instance and its countdown timer
//! - Terminal decisions, which feed the session store and the counters
//! - Re-creation after the host page removes the overlay
//!
//! Hosts feed it three kinds of input: store changes
//! ([`on_store_change`](NudgeManager::on_store_change)), timer events
//! ([`on_timer`](NudgeManager::on_timer)) and user or page signals
//! ([`continue_to_site`](NudgeManager::continue_to_site),
//! [`abandon`](NudgeManager::abandon), [`on_surface_removed`](NudgeManager::on_surface_removed)).
//! Persistence failures are logged and swallowed; the overlay always reaches
//! its terminal state.

use crate::clock::{Clock, SystemClock};
use crate::config::NudgeConfig;
use crate::domain::normalize;
use crate::overlay::prompts::prompt_for;
use crate::overlay::{
    Host, OverlayInstance, OverlayView, Phase, Scheduler, Surface, TickOutcome, TimerEvent,
    TimerHandle,
};
use crate::policy::engine::PolicyEngine;
use crate::session::{SessionState, SessionStore};
use crate::settings::Settings;
use crate::stats::{Decision, StatsRecorder};
use crate::store::{self, KeyValueStore, Scope, StoreChange, SESSIONS_KEY, SETTINGS_KEY};
use crate::NudgeError;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

/// External collaborators a manager drives.
#[derive(Clone)]
pub struct Collaborators {
    /// Persistent key-value store.
    pub store: Arc<dyn KeyValueStore>,
    /// Timer facility.
    pub scheduler: Arc<dyn Scheduler>,
    /// Rendering surface for the overlay.
    pub surface: Arc<dyn Surface>,
    /// The page context.
    pub host: Arc<dyn Host>,
}

/// What a user action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// No overlay, or the action is not available in the current phase.
    Ignored,
    /// The overlay ended with this decision.
    Completed(Decision),
}

/// Pause manager for one page context.
///
/// Create one per page and feed it events; at most one overlay instance and
/// one countdown timer exist at a time.
pub struct NudgeManager {
    config: NudgeConfig,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn Scheduler>,
    surface: Arc<dyn Surface>,
    host: Arc<dyn Host>,
    sessions: SessionStore,
    stats: StatsRecorder,
    engine: PolicyEngine,
    domain: String,
    overlay: Option<OverlayInstance>,
    tick: Option<TimerHandle>,
    reinject: Option<(u64, TimerHandle)>,
    next_instance: u64,
    removal_generation: u64,
}

impl NudgeManager {
    /// Create a manager for the host's current page.
    ///
    /// Uses the system clock for time operations.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails.
    pub fn new(config: NudgeConfig, collaborators: Collaborators) -> Result<Self, NudgeError> {
        Self::with_clock(config, collaborators, Arc::new(SystemClock))
    }

    /// Create a manager with a custom clock.
    pub fn with_clock(
        config: NudgeConfig,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NudgeError> {
        config.validate()?;

        let Collaborators {
            store,
            scheduler,
            surface,
            host,
        } = collaborators;

        let domain = normalize(&host.hostname());
        let engine = PolicyEngine::new(clock.clone(), config.unlock_scope);
        let sessions = SessionStore::new(store.clone(), clock.clone());
        let stats = StatsRecorder::new(store.clone());

        Ok(Self {
            config,
            clock,
            store,
            scheduler,
            surface,
            host,
            sessions,
            stats,
            engine,
            domain,
            overlay: None,
            tick: None,
            reinject: None,
            next_instance: 0,
            removal_generation: 0,
        })
    }

    /// Subscribe to store changes. Subscribe before [`start`](Self::start)
    /// so no change slips between the initial load and the first pump.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe()
    }

    /// Load settings and sessions and show the overlay if required.
    ///
    /// Any load failure leaves the page unpaused.
    pub fn start(&mut self) {
        match store::load::<Settings>(self.store.as_ref(), Scope::Roaming, SETTINGS_KEY) {
            Ok(settings) => self.engine.apply_settings(settings.clamped()),
            Err(e) => {
                warn!(error = %e, "failed to load settings, not pausing");
                return;
            }
        }

        if !self.engine.has_blacklist() {
            debug!("blacklist empty, nothing to check");
            return;
        }

        if !self.refresh_sessions() {
            return;
        }

        self.reconcile();
    }

    /// React to a store change notification.
    pub fn on_store_change(&mut self, change: &StoreChange) {
        if change.is(Scope::Roaming, SETTINGS_KEY) {
            match store::decode::<Settings>(SETTINGS_KEY, change.new_value.clone()) {
                Ok(settings) => {
                    self.engine.apply_settings(settings.clamped());
                    if self.engine.has_blacklist() && self.engine.sessions().is_none() {
                        self.refresh_sessions();
                    }
                }
                Err(e) => {
                    warn!(error = %e, "ignoring malformed settings change");
                    return;
                }
            }
        } else if change.is(Scope::Local, SESSIONS_KEY) {
            match store::decode::<SessionState>(SESSIONS_KEY, change.new_value.clone()) {
                Ok(sessions) => self.engine.apply_sessions(sessions),
                Err(e) => {
                    warn!(error = %e, "ignoring malformed sessions change");
                    return;
                }
            }
        } else {
            return;
        }

        self.reconcile();
    }

    /// Drain every queued change from `changes`. Returns how many were handled.
    ///
    /// If the receiver lagged, both snapshots are reloaded from the store.
    pub fn pump_changes(&mut self, changes: &mut broadcast::Receiver<StoreChange>) -> usize {
        let mut handled = 0;
        loop {
            match changes.try_recv() {
                Ok(change) => {
                    self.on_store_change(&change);
                    handled += 1;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "store change notifications lagged, reloading");
                    self.start();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    /// Deliver a timer event.
    pub fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Tick { instance } => self.on_tick(instance),
            TimerEvent::Reinject { generation } => self.on_reinject(generation),
        }
    }

    /// "Continue to site": honoured only once the countdown has finished.
    pub fn continue_to_site(&mut self) -> ActionOutcome {
        let Some(overlay) = self.overlay.as_mut() else {
            return ActionOutcome::Ignored;
        };
        if !overlay.decide(Decision::Continue) {
            debug!(remaining = overlay.remaining_seconds(), "continue ignored while counting");
            return ActionOutcome::Ignored;
        }
        let domain = overlay.domain().to_string();

        let unlock_minutes = self
            .engine
            .settings()
            .map(|s| s.unlock_duration)
            .unwrap_or_else(|| Settings::default().unlock_duration);
        let key = self.engine.unlock_key(&domain);

        self.engine.note_grant(&key, unlock_minutes);
        if let Err(e) = self.sessions.grant(&key, unlock_minutes) {
            warn!(domain = %key, error = %e, "failed to persist unlock");
        }
        if let Err(e) = self.stats.record(Decision::Continue) {
            warn!(error = %e, "failed to record intentional visit");
        }

        info!(domain = %key, unlock_minutes, "continued to site");
        self.teardown();
        ActionOutcome::Completed(Decision::Continue)
    }

    /// "Close tab": honoured while counting or decidable. Never grants an unlock.
    pub fn abandon(&mut self) -> ActionOutcome {
        let Some(overlay) = self.overlay.as_mut() else {
            return ActionOutcome::Ignored;
        };
        if !overlay.decide(Decision::Abandon) {
            return ActionOutcome::Ignored;
        }
        let domain = overlay.domain().to_string();

        if let Err(e) = self.stats.record(Decision::Abandon) {
            warn!(error = %e, "failed to record resisted temptation");
        }
        self.host.request_close_tab();

        info!(domain = %domain, "abandoned visit");
        self.teardown();
        ActionOutcome::Completed(Decision::Abandon)
    }

    /// Dismissal signal (Escape key); same as [`abandon`](Self::abandon).
    pub fn dismiss(&mut self) -> ActionOutcome {
        self.abandon()
    }

    /// The surface was removed by something other than this manager.
    ///
    /// Re-evaluates policy against fresh sessions and, if the pause is still
    /// required, schedules a new overlay after `reinject_delay`.
    pub fn on_surface_removed(&mut self) {
        let Some(mut overlay) = self.overlay.take() else {
            return;
        };
        self.cancel_tick();
        overlay.close();
        warn!(domain = %overlay.domain(), "pause overlay removed by host page");

        if !self.refresh_sessions() || !self.engine.should_pause(&self.domain) {
            return;
        }

        self.cancel_reinject();
        self.removal_generation += 1;
        let generation = self.removal_generation;
        let handle = self
            .scheduler
            .after(self.config.reinject_delay, TimerEvent::Reinject { generation });
        self.reinject = Some((generation, handle));
    }

    /// Phase of the live overlay; `None` when absent.
    pub fn phase(&self) -> Option<Phase> {
        self.overlay.as_ref().map(OverlayInstance::phase)
    }

    /// Countdown value of the live overlay.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.overlay.as_ref().map(OverlayInstance::remaining_seconds)
    }

    /// Whether a re-creation is waiting on its delay.
    pub fn reinject_pending(&self) -> bool {
        self.reinject.is_some()
    }

    /// Normalized hostname this manager was created for.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Current pause decision for this page.
    pub fn should_pause(&self) -> bool {
        self.engine.should_pause(&self.domain)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &NudgeConfig {
        &self.config
    }

    /// Create or destroy the overlay to match the current verdict.
    fn reconcile(&mut self) {
        let required = self.engine.should_pause(&self.domain);

        if required {
            if self.overlay.is_none() && self.reinject.is_none() {
                self.present();
            }
        } else {
            self.cancel_reinject();
            if self.overlay.is_some() {
                debug!(domain = %self.domain, "pause no longer required");
                self.teardown();
            }
        }
    }

    fn present(&mut self) {
        let Some(settings) = self.engine.settings() else {
            return;
        };

        let view = OverlayView {
            domain: self.domain.clone(),
            pause_seconds: settings.pause_duration,
            unlock_minutes: settings.unlock_duration,
            theme: settings.theme.resolve(self.host.prefers_dark()),
            prompt: prompt_for(self.clock.now_millis()),
        };

        self.next_instance += 1;
        let overlay = OverlayInstance::new(self.next_instance, self.domain.clone(), view.pause_seconds);

        self.surface.present(&view);
        if overlay.phase() == Phase::Counting {
            self.tick = Some(self.scheduler.after(
                self.config.tick_interval,
                TimerEvent::Tick {
                    instance: overlay.id(),
                },
            ));
        } else {
            self.surface.enable_continue();
        }

        info!(domain = %self.domain, pause_seconds = view.pause_seconds, "pause overlay presented");
        self.overlay = Some(overlay);
    }

    fn on_tick(&mut self, instance: u64) {
        let Some(overlay) = self.overlay.as_mut().filter(|o| o.id() == instance) else {
            debug!(instance, "dropping stale tick");
            return;
        };
        self.tick = None;

        match overlay.tick() {
            TickOutcome::Counting { remaining } => {
                self.surface.update_countdown(remaining);
                self.tick = Some(
                    self.scheduler
                        .after(self.config.tick_interval, TimerEvent::Tick { instance }),
                );
            }
            TickOutcome::BecameDecidable => {
                self.surface.update_countdown(0);
                self.surface.enable_continue();
                debug!(domain = %self.domain, "countdown finished");
            }
            TickOutcome::Ignored => {}
        }
    }

    fn on_reinject(&mut self, generation: u64) {
        match self.reinject {
            Some((pending, _)) if pending == generation => self.reinject = None,
            _ => {
                debug!(generation, "dropping stale re-creation");
                return;
            }
        }

        if self.overlay.is_none() && self.engine.should_pause(&self.domain) {
            info!(domain = %self.domain, "re-creating removed overlay");
            self.present();
        }
    }

    /// Reload sessions from the store. `false` if the read failed.
    fn refresh_sessions(&mut self) -> bool {
        match self.sessions.load() {
            Ok(sessions) => {
                self.engine.apply_sessions(sessions);
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to load sessions, not pausing");
                false
            }
        }
    }

    /// Stop timers and remove the overlay. Safe to call when absent.
    fn teardown(&mut self) {
        self.cancel_tick();
        self.cancel_reinject();
        if let Some(mut overlay) = self.overlay.take() {
            overlay.close();
            self.surface.dismiss();
        }
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_reinject(&mut self) {
        if let Some((_, handle)) = self.reinject.take() {
            self.scheduler.cancel(handle);
        }
    }
}
