//! # Nudge
//!
//! **A mindful pause in front of distracting sites.**
//!
//! Nudge decides whether a page visit should be interrupted by a short
//! countdown, drives that countdown to a decision, and remembers the outcome:
//! "continue" unlocks the site for a while, abandoning closes the tab and
//! counts a resisted temptation.
//!
//! ## Components
//!
//! - **Policy engine** - suffix matching against a blacklist, honouring
//!   time-limited unlocks
//! - **Session store** - domain to unlock-expiry map with periodic cleanup
//! - **Overlay lifecycle** - `COUNTING -> DECIDABLE -> CLOSED`, one live
//!   instance per page, re-created if the page removes it
//! - **Stats recorder** - exactly one counter per completed pause
//!
//! ## Quickstart
//!
//! ```no_run
//! use nudge::overlay::{Host, ManualScheduler, OverlayView, Surface};
//! use nudge::store::MemoryStore;
//! use nudge::{Collaborators, NudgeConfig, NudgeManager};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Page;
//! impl Host for Page {
//!     fn hostname(&self) -> String { "www.reddit.com".to_string() }
//!     fn request_close_tab(&self) {}
//! }
//!
//! struct Console;
//! impl Surface for Console {
//!     fn present(&self, view: &OverlayView) { println!("{}", view.headline()); }
//!     fn update_countdown(&self, remaining: u32) { println!("{}", remaining); }
//!     fn enable_continue(&self) { println!("continue enabled"); }
//!     fn dismiss(&self) {}
//! }
//!
//! fn main() -> Result<(), nudge::NudgeError> {
//!     let scheduler = Arc::new(ManualScheduler::new());
//!     let mut manager = NudgeManager::new(
//!         NudgeConfig::default(),
//!         Collaborators {
//!             store: Arc::new(MemoryStore::new()),
//!             scheduler: scheduler.clone(),
//!             surface: Arc::new(Console),
//!             host: Arc::new(Page),
//!         },
//!     )?;
//!
//!     manager.start();
//!     scheduler.run_for(Duration::from_secs(10), |event| manager.on_timer(event));
//!     manager.continue_to_site();
//!     Ok(())
//! }
//! ```
//!
//! ## Failure behaviour
//!
//! The page path fails open: if settings or sessions cannot be read, nothing
//! is paused. A decision whose write fails still closes the overlay.
//! Options-page edits through [`SettingsEditor`] report store errors.
//!
//! See [`NudgeConfig`] for runtime cadences.

#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/nudge/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Domain handling
pub mod domain;
pub mod policy;

// Persistence
pub mod session;
pub mod settings;
pub mod stats;
pub mod store;

// Overlay lifecycle
pub mod overlay;

// Page and background entry points
pub mod manager;
pub mod protocol;
pub mod worker;

// tokio bindings
pub mod runtime;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::{NudgeConfig, UnlockScope};
pub use errors::NudgeError;
pub use manager::{ActionOutcome, Collaborators, NudgeManager};
pub use policy::engine::PolicyEngine;
pub use session::{SessionState, SessionStore};
pub use settings::{Settings, SettingsEditor};
pub use stats::{Decision, Stats, StatsRecorder};
pub use worker::BackgroundWorker;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
