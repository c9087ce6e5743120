//! Nudge error types.

use thiserror::Error;

/// Errors that can occur while evaluating, persisting or editing pause policy.
#[derive(Debug, Error)]
pub enum NudgeError {
    /// Runtime configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// User-typed domain did not pass the domain-shape check.
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    /// Domain is already on the blacklist.
    #[error("Domain already added: {0}")]
    DuplicateDomain(String),

    /// A numeric setting is outside its allowed range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    SettingOutOfRange {
        /// Setting name as persisted (e.g. `pauseDuration`).
        name: &'static str,
        /// Rejected value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// Persistent store could not be read or written.
    #[error("Store I/O error: {0}")]
    StoreIO(String),

    /// Stored or supplied JSON did not match the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Imported settings document was rejected as a whole.
    #[error("Import rejected: {0}")]
    ImportRejected(String),

    /// No timer facility is available in the current context.
    #[error("Scheduler unavailable: {0}")]
    SchedulerUnavailable(String),
}
