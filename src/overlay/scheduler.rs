//! Injectable one-shot timers.
//!
//! A scheduler delivers a [`TimerEvent`] after a delay; the host hands the
//! event to [`NudgeManager::on_timer`](crate::manager::NudgeManager::on_timer).
//! Recurring ticks are built by re-arming after each delivery, so at most one
//! countdown timer is ever pending.

use std::sync::Mutex;
use std::time::Duration;

/// Event a timer delivers when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown tick for the overlay instance with this id.
    Tick {
        /// Instance the tick belongs to.
        instance: u64,
    },
    /// Delayed re-creation after forced removal.
    Reinject {
        /// Removal generation the re-creation was scheduled for.
        generation: u64,
    },
}

/// Handle used to cancel a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Timer facility.
pub trait Scheduler: Send + Sync {
    /// Deliver `event` once after `delay`.
    fn after(&self, delay: Duration, event: TimerEvent) -> TimerHandle;

    /// Cancel a pending timer. Cancelling a fired or unknown handle is a no-op.
    fn cancel(&self, handle: TimerHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TimerHandle, TimerEvent)>,
}

/// Scheduler driven by simulated time.
///
/// Nothing fires on its own; [`advance`](ManualScheduler::advance) returns
/// the events that came due, in due order, for the caller to deliver.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    /// Create a scheduler at simulated time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move simulated time forward and collect every event now due.
    ///
    /// Only timers pending before the call are returned. A timer armed while
    /// delivering them fires on a later call, so a re-arming tick advances by
    /// at most one period per call. Use [`run_for`](Self::run_for) to cover
    /// several periods at once.
    pub fn advance(&self, by: Duration) -> Vec<TimerEvent> {
        let Ok(mut state) = self.state.lock() else {
            return Vec::new();
        };
        state.now += by;
        let now = state.now;

        let mut due: Vec<_> = Vec::new();
        state.pending.retain(|entry| {
            if entry.0 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(at, handle, _)| (*at, handle.0));
        due.into_iter().map(|(_, _, event)| event).collect()
    }

    /// Move simulated time forward by `by`, handing each event to `deliver`
    /// at its due time. Timers armed from `deliver` fire in the same call
    /// when they fall due inside the window. Returns how many were delivered.
    pub fn run_for(&self, by: Duration, mut deliver: impl FnMut(TimerEvent)) -> usize {
        let target = match self.state.lock() {
            Ok(state) => state.now + by,
            Err(_) => return 0,
        };

        let mut delivered = 0;
        loop {
            let next = {
                let Ok(mut state) = self.state.lock() else {
                    break;
                };
                let earliest = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, (at, _, _))| *at <= target)
                    .min_by_key(|(_, (at, handle, _))| (*at, handle.0))
                    .map(|(index, _)| index);
                match earliest {
                    Some(index) => {
                        let (at, _, event) = state.pending.remove(index);
                        state.now = at;
                        Some(event)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };

            match next {
                Some(event) => {
                    deliver(event);
                    delivered += 1;
                }
                None => break,
            }
        }
        delivered
    }

    /// Number of timers still pending.
    pub fn pending(&self) -> usize {
        self.state.lock().map(|s| s.pending.len()).unwrap_or(0)
    }

    /// Simulated time elapsed so far.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().map(|s| s.now).unwrap_or_default()
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let Ok(mut state) = self.state.lock() else {
            return TimerHandle(u64::MAX);
        };
        state.next_id += 1;
        let handle = TimerHandle(state.next_id);
        let due = state.now + delay;
        state.pending.push((due, handle, event));
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Ok(mut state) = self.state.lock() {
            state.pending.retain(|(_, h, _)| *h != handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_fires_when_due() {
        let scheduler = ManualScheduler::new();
        scheduler.after(Duration::from_secs(1), TimerEvent::Tick { instance: 1 });

        assert!(scheduler.advance(Duration::from_millis(999)).is_empty());
        assert_eq!(
            scheduler.advance(Duration::from_millis(1)),
            vec![TimerEvent::Tick { instance: 1 }]
        );
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancelled_event_never_fires() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.after(Duration::from_millis(50), TimerEvent::Reinject { generation: 1 });
        scheduler.cancel(handle);

        assert!(scheduler.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_events_returned_in_due_order() {
        let scheduler = ManualScheduler::new();
        scheduler.after(Duration::from_secs(1), TimerEvent::Tick { instance: 1 });
        scheduler.after(Duration::from_millis(50), TimerEvent::Reinject { generation: 7 });

        assert_eq!(
            scheduler.advance(Duration::from_secs(2)),
            vec![
                TimerEvent::Reinject { generation: 7 },
                TimerEvent::Tick { instance: 1 }
            ]
        );
        assert_eq!(scheduler.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_run_for_fires_timers_armed_during_delivery() {
        let scheduler = ManualScheduler::new();
        scheduler.after(Duration::from_secs(1), TimerEvent::Tick { instance: 1 });

        let mut seen = Vec::new();
        let delivered = scheduler.run_for(Duration::from_millis(3500), |event| {
            seen.push(scheduler.elapsed());
            scheduler.after(Duration::from_secs(1), event);
        });

        assert_eq!(delivered, 3);
        assert_eq!(
            seen,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
        assert_eq!(scheduler.elapsed(), Duration::from_millis(3500));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_cancel_unknown_handle_is_noop() {
        let scheduler = ManualScheduler::new();
        scheduler.after(Duration::from_secs(1), TimerEvent::Tick { instance: 1 });
        scheduler.cancel(TimerHandle(999));
        assert_eq!(scheduler.pending(), 1);
    }
}
