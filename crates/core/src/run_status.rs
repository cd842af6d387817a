//! Well-known run status labels.
//!
//! Pollers compare against these strings, so they are part of the
//! external contract and must not change.

/// No event has set a status since the last reset.
pub const STATUS_NONE: &str = "None";

/// The worker has started and is preparing the engine.
pub const STATUS_INITIALIZING: &str = "Initializing";

/// The engine is built and its run entry point is about to be invoked.
pub const STATUS_BEGINNING_RUN: &str = "Beginning run";

/// The engine reported the start of the playbook.
pub const STATUS_STARTING: &str = "Starting";

/// Facts are being gathered on the targeted hosts.
pub const STATUS_GATHERING_FACTS: &str = "Gathering facts";

/// A task is executing.
pub const STATUS_RUNNING: &str = "Running";

/// The engine published its final statistics.
pub const STATUS_STOPPED: &str = "Stopped";

/// The run completed normally.
pub const STATUS_FINISHED: &str = "Finished";

/// The run ended on an engine error or an unexpected worker failure.
pub const STATUS_FINISHED_ERROR: &str = "Finished - Error";

/// Whether `status` marks the end of a run.
///
/// "Stopped" is not terminal: the worker still emits "Finished" after the
/// engine publishes its statistics.
pub fn is_terminal(status: &str) -> bool {
    status == STATUS_FINISHED || status == STATUS_FINISHED_ERROR
}
