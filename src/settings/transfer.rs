//! Settings export and import.
//!
//! The export document is `{version, exportedAt, settings, stats}`. Imports
//! are validated completely before anything is written; a rejected document
//! leaves the store untouched.

use crate::clock::Clock;
use crate::settings::Settings;
use crate::stats::Stats;
use crate::NudgeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format version written into exports.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Exported settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Document format version.
    pub version: String,
    /// When the export was taken.
    pub exported_at: DateTime<Utc>,
    /// Settings at export time.
    pub settings: Settings,
    /// Counters at export time.
    pub stats: Stats,
}

impl ExportDocument {
    /// Snapshot `settings` and `stats` now.
    pub fn new(settings: Settings, stats: Stats, clock: &dyn Clock) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            exported_at: clock.now_utc(),
            settings,
            stats,
        }
    }

    /// Serialize the document to pretty JSON.
    pub fn to_json(&self) -> Result<String, NudgeError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NudgeError::Serialization(format!("Failed to serialize export: {}", e)))
    }

    /// Suggested download name, e.g. `nudge-settings-2025-01-15.json`.
    pub fn file_name(&self) -> String {
        format!("nudge-settings-{}.json", self.exported_at.format("%Y-%m-%d"))
    }
}

/// A validated import, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedData {
    /// Settings to replace the current ones.
    pub settings: Settings,
    /// Counters to replace the current ones; `None` leaves them untouched.
    pub stats: Option<Stats>,
}

/// Validate an import document without touching any state.
///
/// # Errors
/// * `ImportRejected` - not JSON, no `settings` object, `settings.blacklist`
///   is not a list, or any field fails validation
pub fn parse_import(json: &str) -> Result<ImportedData, NudgeError> {
    let doc: Value = serde_json::from_str(json)
        .map_err(|e| NudgeError::ImportRejected(format!("not valid JSON: {}", e)))?;

    let settings_value = doc
        .get("settings")
        .filter(|v| v.is_object())
        .ok_or_else(|| NudgeError::ImportRejected("missing settings object".to_string()))?;

    if !settings_value.get("blacklist").is_some_and(Value::is_array) {
        return Err(NudgeError::ImportRejected(
            "settings.blacklist must be a list".to_string(),
        ));
    }

    let settings: Settings = serde_json::from_value(settings_value.clone())
        .map_err(|e| NudgeError::ImportRejected(format!("invalid settings: {}", e)))?;
    settings
        .validate()
        .map_err(|e| NudgeError::ImportRejected(e.to_string()))?;

    let stats = match doc.get("stats") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value(value.clone())
                .map_err(|e| NudgeError::ImportRejected(format!("invalid stats: {}", e)))?,
        ),
    };

    Ok(ImportedData { settings, stats })
}
