//! Consumer-side aggregation of progress events into a run status.
//!
//! [`StatusAggregator`] owns the receiving half of the current run's event
//! channel together with the cumulative [`RunStatus`]. Both live behind one
//! mutex, so a drain and the merge that follows it are atomic with respect
//! to other pollers: no event is applied twice and no poller observes a
//! half-merged batch.

use chrono::Utc;
use runbook_core::run_status::STATUS_NONE;
use runbook_core::types::{LogEntry, RunId, Timestamp};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::channel::{channel, EventReceiver, EventSender};
use crate::event::ProgressEvent;

/// Cumulative view of the current (or most recent) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    /// Id of the run this status belongs to; `None` before the first run.
    pub run_id: Option<RunId>,
    /// Latest status label, `"None"` until an event sets one.
    pub status: String,
    /// Every logged message of the run, in emission order.
    pub log: Vec<LogEntry>,
    pub started_at: Option<Timestamp>,
}

impl Default for RunStatus {
    fn default() -> Self {
        Self {
            run_id: None,
            status: STATUS_NONE.to_string(),
            log: Vec::new(),
            started_at: None,
        }
    }
}

impl RunStatus {
    /// Fold one event into the status. Later status values win.
    fn apply(&mut self, event: ProgressEvent) {
        if let Some(message) = event.message {
            self.log.push(LogEntry::new(message, event.severity));
        }
        if let Some(status) = event.run_status {
            self.status = status;
        }
    }
}

struct AggregatorState {
    receiver: EventReceiver,
    current: RunStatus,
}

impl AggregatorState {
    fn drain(&mut self) -> usize {
        let events = self.receiver.try_receive_all();
        let count = events.len();
        for event in events {
            self.current.apply(event);
        }
        count
    }
}

/// Drains the event channel on demand and serves status snapshots.
///
/// Designed to be wrapped in `Arc` and shared between the job runner and
/// any number of polling request handlers.
pub struct StatusAggregator {
    state: Mutex<AggregatorState>,
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusAggregator {
    /// Create an aggregator with an empty status and no run attached.
    pub fn new() -> Self {
        // The sender is dropped immediately: until the first reset there is
        // nobody to emit events.
        let (_, receiver) = channel();
        Self {
            state: Mutex::new(AggregatorState {
                receiver,
                current: RunStatus::default(),
            }),
        }
    }

    /// Replace the status with a fresh one for `run_id` and open a new
    /// event channel for it.
    ///
    /// Any event still queued from a previous run is discarded along with
    /// the old receiver. The returned sender is the only way to feed the
    /// new run's status.
    pub async fn reset(&self, run_id: RunId) -> EventSender {
        let (sender, receiver) = channel();
        let mut state = self.state.lock().await;
        state.receiver = receiver;
        state.current = RunStatus {
            run_id: Some(run_id),
            started_at: Some(Utc::now()),
            ..RunStatus::default()
        };
        tracing::debug!(%run_id, "Run status reset");
        sender
    }

    /// Apply every pending event and return how many were applied.
    pub async fn drain_and_apply(&self) -> usize {
        self.state.lock().await.drain()
    }

    /// Apply pending events and return a copy of the merged status.
    pub async fn snapshot(&self) -> RunStatus {
        let mut state = self.state.lock().await;
        state.drain();
        state.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use runbook_core::types::Severity;

    use super::*;

    #[tokio::test]
    async fn fresh_aggregator_reports_none() {
        let aggregator = StatusAggregator::new();
        let status = aggregator.snapshot().await;
        assert_eq!(status, RunStatus::default());
        assert_eq!(status.status, "None");
    }

    #[tokio::test]
    async fn reset_then_snapshot_is_empty() {
        let aggregator = StatusAggregator::new();
        let run_id = RunId::new_v4();
        let _tx = aggregator.reset(run_id).await;

        let status = aggregator.snapshot().await;
        assert_eq!(status.status, "None");
        assert!(status.log.is_empty());
        assert_eq!(status.run_id, Some(run_id));
        assert!(status.started_at.is_some());
    }

    #[tokio::test]
    async fn snapshot_applies_events_in_order() {
        let aggregator = StatusAggregator::new();
        let tx = aggregator.reset(RunId::new_v4()).await;

        tx.send(ProgressEvent::status("Starting")).expect("send");
        tx.send(ProgressEvent::message("Play 'web' started")).expect("send");
        tx.send(ProgressEvent::message("Task 'ping' started").with_status("Running"))
            .expect("send");
        tx.send(ProgressEvent::log("OK - web1", Severity::Success)).expect("send");
        tx.send(ProgressEvent::log("Failed - web2", Severity::Danger)).expect("send");

        let status = aggregator.snapshot().await;
        assert_eq!(status.status, "Running");
        assert_eq!(
            status.log,
            vec![
                LogEntry::new("Play 'web' started", None),
                LogEntry::new("Task 'ping' started", None),
                LogEntry::new("OK - web1", Some(Severity::Success)),
                LogEntry::new("Failed - web2", Some(Severity::Danger)),
            ]
        );
    }

    #[tokio::test]
    async fn last_status_in_batch_wins() {
        let aggregator = StatusAggregator::new();
        let tx = aggregator.reset(RunId::new_v4()).await;

        tx.send(ProgressEvent::status("Gathering facts")).expect("send");
        tx.send(ProgressEvent::status("Running")).expect("send");
        tx.send(ProgressEvent::message("no status here")).expect("send");

        assert_eq!(aggregator.snapshot().await.status, "Running");
    }

    #[tokio::test]
    async fn repeated_snapshots_are_identical() {
        let aggregator = StatusAggregator::new();
        let tx = aggregator.reset(RunId::new_v4()).await;
        tx.send(ProgressEvent::message("one")).expect("send");

        let first = aggregator.snapshot().await;
        let second = aggregator.snapshot().await;
        assert_eq!(first, second);
        assert_eq!(second.log.len(), 1);
    }

    #[tokio::test]
    async fn reset_discards_stale_events() {
        let aggregator = StatusAggregator::new();
        let old_tx = aggregator.reset(RunId::new_v4()).await;
        old_tx.send(ProgressEvent::message("old run")).expect("send");

        let new_tx = aggregator.reset(RunId::new_v4()).await;
        assert!(old_tx.is_closed(), "old sender must be disconnected by reset");
        new_tx.send(ProgressEvent::message("new run")).expect("send");

        let status = aggregator.snapshot().await;
        assert_eq!(status.log, vec![LogEntry::new("new run", None)]);
    }

    #[tokio::test]
    async fn drain_and_apply_counts_events() {
        let aggregator = StatusAggregator::new();
        let tx = aggregator.reset(RunId::new_v4()).await;
        tx.send(ProgressEvent::status("Starting")).expect("send");
        tx.send(ProgressEvent::message("a")).expect("send");

        assert_eq!(aggregator.drain_and_apply().await, 2);
        assert_eq!(aggregator.drain_and_apply().await, 0);
        assert_eq!(aggregator.snapshot().await.log.len(), 1);
    }
}
