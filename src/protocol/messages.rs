//! Messages sent from a page context to the privileged background context.

use crate::NudgeError;
use serde::{Deserialize, Serialize};

/// Identifier of a browser tab, as assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

/// Message from a page to the background worker.
///
/// Wire form is an object tagged by `type`, e.g. `{"type":"CLOSE_TAB"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeMessage {
    /// Close the tab that sent the message.
    #[serde(rename = "CLOSE_TAB")]
    CloseTab,
}

impl RuntimeMessage {
    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String, NudgeError> {
        serde_json::to_string(self)
            .map_err(|e| NudgeError::Serialization(format!("Failed to serialize message: {}", e)))
    }

    /// Parse the wire form.
    pub fn from_json(json: &str) -> Result<Self, NudgeError> {
        serde_json::from_str(json)
            .map_err(|e| NudgeError::Serialization(format!("Failed to parse message: {}", e)))
    }
}
