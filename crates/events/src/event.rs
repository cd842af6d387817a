//! The progress event record.

use runbook_core::types::Severity;
use serde::Serialize;

/// A single progress update emitted while a run executes.
///
/// Each field is an independent axis: an absent field means "no update".
/// Constructors always set at least a message or a status, so an event
/// never carries nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Line to append to the run log.
    pub message: Option<String>,
    /// Presentation hint for `message`.
    pub severity: Option<Severity>,
    /// New status label for the run (see `runbook_core::run_status`).
    pub run_status: Option<String>,
}

impl ProgressEvent {
    /// A log line without a severity.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            severity: None,
            run_status: None,
        }
    }

    /// A log line with a severity.
    pub fn log(message: impl Into<String>, severity: Severity) -> Self {
        Self::message(message).with_severity(severity)
    }

    /// A status change with no log line.
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            message: None,
            severity: None,
            run_status: Some(status.into()),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.run_status = Some(status.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_event_carries_no_message() {
        let event = ProgressEvent::status("Running");
        assert!(event.message.is_none());
        assert!(event.severity.is_none());
        assert_eq!(event.run_status.as_deref(), Some("Running"));
    }

    #[test]
    fn log_event_with_status() {
        let event = ProgressEvent::log("Finished execution", Severity::Success).with_status("Finished");
        assert_eq!(event.message.as_deref(), Some("Finished execution"));
        assert_eq!(event.severity, Some(Severity::Success));
        assert_eq!(event.run_status.as_deref(), Some("Finished"));
    }
}
