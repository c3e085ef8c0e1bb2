//! Message model and submission validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum characters per sign line; the board renders 14 columns.
pub const MAX_LINE_CHARS: usize = 14;

/// A queued message as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub line3: String,
    #[serde(default)]
    pub line4: String,
    /// Set to true exactly once, when the rotation interval elapses
    /// while this message is current.
    #[serde(default)]
    pub shown: bool,
    pub timestamp: DateTime<Utc>,
}

/// Normalize a line the way the board stores it: uppercased and
/// truncated to the column cap. Truncation counts characters, not bytes.
pub fn sanitize_line(line: &str) -> String {
    line.to_uppercase().chars().take(MAX_LINE_CHARS).collect()
}

/// A validated, sanitized submission payload.
///
/// `line1` is mandatory and non-empty; lines 2-4 are optional. All lines
/// are sanitized before the draft ever reaches the wire, so a draft can
/// be submitted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub line3: String,
    #[serde(default)]
    pub line4: String,
}

impl MessageDraft {
    pub fn new(
        line1: &str,
        line2: &str,
        line3: &str,
        line4: &str,
    ) -> Result<Self, ValidationError> {
        if line1.trim().is_empty() {
            return Err(ValidationError::MissingField("line1"));
        }
        Ok(Self {
            line1: sanitize_line(line1),
            line2: sanitize_line(line2),
            line3: sanitize_line(line3),
            line4: sanitize_line(line4),
        })
    }
}

/// The four lines the board renders at any moment.
///
/// Either the current queued message or the synthetic placeholder shown
/// when the queue is empty. The placeholder has no backing message and
/// never starts a countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SignText {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
}

impl SignText {
    pub fn new(line1: &str, line2: &str, line3: &str, line4: &str) -> Self {
        Self {
            line1: line1.to_string(),
            line2: line2.to_string(),
            line3: line3.to_string(),
            line4: line4.to_string(),
        }
    }

    /// Non-empty lines in display order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        [
            self.line1.as_str(),
            self.line2.as_str(),
            self.line3.as_str(),
            self.line4.as_str(),
        ]
        .into_iter()
        .filter(|l| !l.is_empty())
    }
}

impl Default for SignText {
    fn default() -> Self {
        Self::new("WELCOME", "LEAVE A MSG", "", "")
    }
}

impl From<&Message> for SignText {
    fn from(message: &Message) -> Self {
        Self::new(
            &message.line1,
            &message.line2,
            &message.line3,
            &message.line4,
        )
    }
}

/// Read-only aggregate counters served by the backend.
///
/// `total_submitted` counts every submission ever made, including deleted
/// messages; `total_messages` and `shown_messages` reflect the live queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_submitted: u64,
    pub total_messages: u64,
    pub shown_messages: u64,
}
