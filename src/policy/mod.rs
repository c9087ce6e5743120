//! Pause policy: blacklist matching and the combined pause decision.

pub mod engine;
pub mod matcher;
