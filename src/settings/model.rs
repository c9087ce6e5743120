//! Persisted user settings.

use crate::domain::normalize;
use crate::NudgeError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Allowed pause durations in seconds.
pub const PAUSE_DURATION_RANGE: (u32, u32) = (5, 30);

/// Allowed unlock durations in minutes.
pub const UNLOCK_DURATION_RANGE: (u32, u32) = (1, 60);

static DEFAULT_SETTINGS: Lazy<Settings> = Lazy::new(|| Settings {
    blacklist: Blacklist::from(vec![
        "twitter.com".to_string(),
        "x.com".to_string(),
        "facebook.com".to_string(),
        "instagram.com".to_string(),
        "reddit.com".to_string(),
        "tiktok.com".to_string(),
        "youtube.com".to_string(),
    ]),
    pause_duration: 10,
    unlock_duration: 15,
    theme: Theme::System,
});

/// Ordered set of normalized domains.
///
/// Order only matters for display. Every constructor, including
/// deserialization, normalizes entries and drops duplicates and empties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Blacklist {
    entries: Vec<String>,
}

impl Blacklist {
    /// Create an empty blacklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a domain, normalizing it first.
    ///
    /// Returns `false` if the (normalized) domain was already present or empty.
    pub fn insert(&mut self, domain: &str) -> bool {
        let domain = normalize(domain.trim());
        if domain.is_empty() || self.contains(&domain) {
            return false;
        }
        self.entries.push(domain);
        true
    }

    /// Remove a domain. Returns `true` if it was present.
    pub fn remove(&mut self, domain: &str) -> bool {
        let domain = normalize(domain.trim());
        let before = self.entries.len();
        self.entries.retain(|d| *d != domain);
        self.entries.len() != before
    }

    /// Exact membership of a normalized domain.
    pub fn contains(&self, domain: &str) -> bool {
        self.entries.iter().any(|d| d == domain)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the blacklist is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<String>> for Blacklist {
    fn from(raw: Vec<String>) -> Self {
        let mut list = Blacklist::new();
        for entry in &raw {
            list.insert(entry);
        }
        list
    }
}

impl From<Blacklist> for Vec<String> {
    fn from(list: Blacklist) -> Self {
        list.entries
    }
}

impl<'a> IntoIterator for &'a Blacklist {
    type Item = &'a str;
    type IntoIter = Box<dyn Iterator<Item = &'a str> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the host's color-scheme preference.
    #[default]
    System,
}

/// A theme with `System` resolved away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
    /// Light palette.
    Light,
    /// Dark palette.
    Dark,
}

impl Theme {
    /// Resolve against the host's dark-mode preference.
    pub fn resolve(self, host_prefers_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System if host_prefers_dark => ResolvedTheme::Dark,
            Theme::System => ResolvedTheme::Light,
        }
    }
}

/// User-configurable settings, stored under the roaming `settings` key.
///
/// Missing fields fall back to the defaults, so partially written or older
/// documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Domains that trigger the pause.
    pub blacklist: Blacklist,

    /// Countdown length in seconds (5-30).
    pub pause_duration: u32,

    /// How long a domain stays unlocked after continuing, in minutes (1-60).
    pub unlock_duration: u32,

    /// UI theme preference.
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        DEFAULT_SETTINGS.clone()
    }
}

impl Settings {
    /// Check both durations against their ranges.
    ///
    /// # Errors
    /// * `SettingOutOfRange` - first offending field
    pub fn validate(&self) -> Result<(), NudgeError> {
        check_range("pauseDuration", self.pause_duration, PAUSE_DURATION_RANGE)?;
        check_range("unlockDuration", self.unlock_duration, UNLOCK_DURATION_RANGE)?;
        Ok(())
    }

    /// Clamp out-of-range durations into range.
    ///
    /// Used when loading from the store, where rejecting would leave the
    /// engine without any settings.
    pub fn clamped(mut self) -> Self {
        let pause = clamp(self.pause_duration, PAUSE_DURATION_RANGE);
        let unlock = clamp(self.unlock_duration, UNLOCK_DURATION_RANGE);
        if pause != self.pause_duration || unlock != self.unlock_duration {
            warn!(
                pause_duration = self.pause_duration,
                unlock_duration = self.unlock_duration,
                "stored durations out of range, clamping"
            );
        }
        self.pause_duration = pause;
        self.unlock_duration = unlock;
        self
    }
}

pub(crate) fn check_range(
    name: &'static str,
    value: u32,
    (min, max): (u32, u32),
) -> Result<(), NudgeError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(NudgeError::SettingOutOfRange {
            name,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        })
    }
}

fn clamp(value: u32, (min, max): (u32, u32)) -> u32 {
    value.clamp(min, max)
}
