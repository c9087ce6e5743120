//! tokio bindings for hosts that run on a real clock.
//!
//! [`TokioScheduler`] delivers timer events over an unbounded channel; the
//! host loop reads them and calls [`NudgeManager::on_timer`](crate::NudgeManager::on_timer).
//! [`spawn_sweeper`] fires the cleanup alarm on an interval and
//! [`ChannelHost`] forwards close-tab requests to the background side.

use crate::overlay::{Host, Scheduler, TimerEvent, TimerHandle};
use crate::protocol::{RuntimeMessage, TabId};
use crate::worker::{BackgroundWorker, CLEANUP_ALARM};
use crate::NudgeError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Scheduler backed by tokio timers.
pub struct TokioScheduler {
    handle: Handle,
    events: mpsc::UnboundedSender<TimerEvent>,
    tasks: Mutex<HashMap<u64, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    /// Create a scheduler on the current tokio runtime.
    ///
    /// # Errors
    /// `SchedulerUnavailable` when called outside a runtime.
    pub fn new(events: mpsc::UnboundedSender<TimerEvent>) -> Result<Self, NudgeError> {
        let handle =
            Handle::try_current().map_err(|e| NudgeError::SchedulerUnavailable(e.to_string()))?;
        Ok(Self {
            handle,
            events,
            tasks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let events = self.events.clone();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(event).is_err() {
                debug!(?event, "timer receiver gone, dropping event");
            }
        });

        match self.tasks.lock() {
            Ok(mut tasks) => {
                tasks.retain(|_, t| !t.is_finished());
                tasks.insert(id, task);
            }
            Err(_) => warn!("scheduler task table poisoned, timer cannot be cancelled"),
        }
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let task = match self.tasks.lock() {
            Ok(mut tasks) => tasks.remove(&handle.0),
            Err(_) => None,
        };
        if let Some(task) = task {
            task.abort();
        }
    }
}

/// Run the cleanup alarm every `interval` on the current runtime.
///
/// The first sweep happens one `interval` after the call.
///
/// # Panics
/// Panics when called outside a tokio runtime.
pub fn spawn_sweeper(worker: Arc<BackgroundWorker>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            worker.on_alarm(CLEANUP_ALARM);
        }
    })
}

/// [`Host`] for one tab that forwards close requests over a channel.
pub struct ChannelHost {
    hostname: String,
    tab: TabId,
    prefers_dark: bool,
    outbox: mpsc::UnboundedSender<(RuntimeMessage, Option<TabId>)>,
}

impl ChannelHost {
    /// Host for `hostname` open in `tab`.
    pub fn new(
        hostname: impl Into<String>,
        tab: TabId,
        outbox: mpsc::UnboundedSender<(RuntimeMessage, Option<TabId>)>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            tab,
            prefers_dark: false,
            outbox,
        }
    }

    /// Report a dark color-scheme preference.
    pub fn with_dark_preference(mut self, prefers_dark: bool) -> Self {
        self.prefers_dark = prefers_dark;
        self
    }
}

impl Host for ChannelHost {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    fn request_close_tab(&self) {
        if self.outbox.send((RuntimeMessage::CloseTab, Some(self.tab))).is_err() {
            warn!(tab = self.tab.0, "background side gone, close request dropped");
        }
    }
}
