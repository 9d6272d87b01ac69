//! Input event types for the keytempo engine.
//!
//! Events carry only what the metrics need: entered text (a single
//! character for a keystroke, longer for a paste) or a deletion size.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened in the host's text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEventKind {
    /// Characters entered at the cursor.
    CharsEntered(String),
    /// A deletion removing this many characters.
    CharsDeleted(u64),
}

/// A single text-input event from the host surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: InputEventKind,
}

impl InputEvent {
    /// Create an entered-text event stamped now.
    pub fn entered(text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: InputEventKind::CharsEntered(text.into()),
        }
    }

    /// Create a deletion event stamped now.
    pub fn deleted(count: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: InputEventKind::CharsDeleted(count),
        }
    }
}
