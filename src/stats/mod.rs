//! Outcome counters.

pub mod recorder;

pub use recorder::{Decision, Stats, StatsRecorder};
