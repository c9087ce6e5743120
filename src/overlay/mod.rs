//! The pause overlay: its state machine and the collaborators it drives.
//!
//! The state machine itself ([`instance`]) is pure. Timers go through a
//! [`Scheduler`](scheduler::Scheduler) whose events are fed back to the
//! manager, and rendering goes through a [`Surface`](surface::Surface).

pub mod instance;
pub mod prompts;
pub mod scheduler;
pub mod surface;

pub use instance::{OverlayInstance, Phase, TickOutcome};
pub use scheduler::{ManualScheduler, Scheduler, TimerEvent, TimerHandle};
pub use surface::{Host, OverlayView, Surface};
