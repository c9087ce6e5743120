//! One pause instance.
//!
//! ```text
//! COUNTING --tick x pauseDuration--> DECIDABLE
//!    |                                  |
//!    +--abandon--> CLOSED <--continue---+
//!    +--abandon-------^
//! ```
//!
//! Continue is only honoured in `Decidable`; abandon is honoured in both
//! live phases. `Closed` is terminal.

use crate::stats::Decision;

/// Phase of a pause instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Countdown running; continue is disabled.
    Counting,
    /// Countdown finished; continue is enabled.
    Decidable,
    /// Torn down. No further transitions.
    Closed,
}

/// Result of a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; `remaining` seconds left.
    Counting {
        /// Seconds left on the countdown.
        remaining: u32,
    },
    /// This tick reached zero.
    BecameDecidable,
    /// Tick arrived outside `Counting`.
    Ignored,
}

/// Transient state of one pause, never persisted.
#[derive(Debug, Clone)]
pub struct OverlayInstance {
    id: u64,
    domain: String,
    remaining_seconds: u32,
    phase: Phase,
}

impl OverlayInstance {
    /// Start counting down from `pause_seconds` for `domain`.
    ///
    /// A zero-length pause starts out decidable.
    pub fn new(id: u64, domain: impl Into<String>, pause_seconds: u32) -> Self {
        let phase = if pause_seconds == 0 {
            Phase::Decidable
        } else {
            Phase::Counting
        };
        Self {
            id,
            domain: domain.into(),
            remaining_seconds: pause_seconds,
            phase,
        }
    }

    /// Identifier used to discard timer events for older instances.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Normalized domain captured at creation.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Seconds left; never negative.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether continue would be honoured now.
    pub fn can_continue(&self) -> bool {
        self.phase == Phase::Decidable
    }

    /// Whether abandon would be honoured now.
    pub fn can_abandon(&self) -> bool {
        matches!(self.phase, Phase::Counting | Phase::Decidable)
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Counting {
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.phase = Phase::Decidable;
            TickOutcome::BecameDecidable
        } else {
            TickOutcome::Counting {
                remaining: self.remaining_seconds,
            }
        }
    }

    /// Apply a terminal decision. Returns `false` (and changes nothing) when
    /// the decision is not allowed in the current phase.
    pub fn decide(&mut self, decision: Decision) -> bool {
        let allowed = match decision {
            Decision::Continue => self.can_continue(),
            Decision::Abandon => self.can_abandon(),
        };
        if allowed {
            self.phase = Phase::Closed;
        }
        allowed
    }

    /// Close without a decision (policy no longer requires the pause, or
    /// the surface was removed out from under us).
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
    }
}
