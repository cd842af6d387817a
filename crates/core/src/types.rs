//! Shared primitive types.

use serde::{Deserialize, Serialize};

/// UTC timestamp used on every serialized time value.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier assigned to each playbook run.
pub type RunId = uuid::Uuid;

/// Coarse classification of a log entry, used for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

/// One line of a run's cumulative log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    /// `None` for plain lines that carry no presentation hint.
    pub severity: Option<Severity>,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, severity: Option<Severity>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}
