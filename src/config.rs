//! Nudge runtime configuration.

use std::time::Duration;

/// Which key a "continue" unlock is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockScope {
    /// The normalized hostname that was visited (`old.reddit.com`).
    ///
    /// Sibling subdomains of the same blacklist entry each need their own unlock.
    #[default]
    VisitedHost,

    /// The blacklist entry that matched the visit (`reddit.com`).
    ///
    /// One unlock covers every subdomain of that entry.
    MatchedEntry,
}

/// Runtime configuration for a Nudge deployment.
///
/// These are host-level cadences and policy knobs, distinct from the
/// user-editable [`Settings`](crate::settings::Settings) kept in the store.
#[derive(Debug, Clone)]
pub struct NudgeConfig {
    /// Namespace used for on-disk storage (e.g. "nudge").
    /// Each installation should use a unique namespace to avoid collisions.
    pub namespace: &'static str,

    /// Countdown tick period.
    pub tick_interval: Duration,

    /// How often expired unlocks are swept from the session map.
    pub sweep_interval: Duration,

    /// Delay before re-creating an overlay that was removed by the host page.
    pub reinject_delay: Duration,

    /// Key used when granting and checking unlocks.
    pub unlock_scope: UnlockScope,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            namespace: "nudge",
            tick_interval: Duration::from_secs(1),
            sweep_interval: Duration::from_secs(60),
            reinject_delay: Duration::from_millis(50),
            unlock_scope: UnlockScope::default(),
        }
    }
}

impl NudgeConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::NudgeError> {
        if self.namespace.is_empty() {
            return Err(crate::NudgeError::ConfigError(
                "namespace cannot be empty".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(crate::NudgeError::ConfigError(
                "tick_interval must be non-zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(crate::NudgeError::ConfigError(
                "sweep_interval must be non-zero".to_string(),
            ));
        }
        if self.reinject_delay.is_zero() || self.reinject_delay >= Duration::from_secs(1) {
            return Err(crate::NudgeError::ConfigError(format!(
                "reinject_delay must be between 1ms and 1s, got {:?}",
                self.reinject_delay
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NudgeError;

    #[test]
    fn test_default_config_is_valid() {
        let config = NudgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.unlock_scope, UnlockScope::VisitedHost);
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let config = NudgeConfig {
            namespace: "",
            ..NudgeConfig::default()
        };
        assert!(matches!(config.validate(), Err(NudgeError::ConfigError(_))));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = NudgeConfig {
            tick_interval: Duration::ZERO,
            ..NudgeConfig::default()
        };
        assert!(matches!(config.validate(), Err(NudgeError::ConfigError(_))));
    }

    #[test]
    fn test_slow_reinject_rejected() {
        let config = NudgeConfig {
            reinject_delay: Duration::from_secs(2),
            ..NudgeConfig::default()
        };
        assert!(matches!(config.validate(), Err(NudgeError::ConfigError(_))));
    }
}
