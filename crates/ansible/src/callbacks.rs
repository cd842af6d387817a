//! Hook traits an engine drives while it runs.
//!
//! Every method corresponds to one progress point of a playbook run. Hooks
//! are invoked sequentially from the engine's own task; they must return
//! quickly and must not block.

use crate::engine::EngineError;
use crate::stats::AggregateStats;

/// Playbook-level hooks.
pub trait PlaybookCallbacks: Send {
    /// The playbook started.
    fn on_start(&mut self);

    fn on_play_start(&mut self, name: &str);

    /// Facts are about to be gathered on the play's hosts.
    fn on_setup(&mut self);

    /// A task started. `is_conditional` is set for notified handlers.
    fn on_task_start(&mut self, name: &str, is_conditional: bool);

    fn on_no_hosts_matched(&mut self);

    fn on_no_hosts_remaining(&mut self);

    /// The run is over and final per-host counters are available.
    fn on_stats(&mut self, stats: &AggregateStats);

    /// The playbook requests a value for `name` interactively.
    ///
    /// Background runs have no terminal, so implementations are expected
    /// to fail with [`EngineError::InteractivePrompt`] and the engine must
    /// abort the run.
    fn on_vars_prompt(&mut self, name: &str) -> Result<String, EngineError>;
}

/// Per-host result hooks.
pub trait RunnerCallbacks: Send {
    fn on_ok(&mut self, host: &str, changed: bool);

    fn on_failed(&mut self, host: &str);

    fn on_unreachable(&mut self, host: &str);

    fn on_skipped(&mut self, host: &str, item: Option<&str>);
}

/// Base behaviour of the hooks: human-readable console output through
/// `tracing`, the way `ansible-playbook` narrates a run on a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleCallbacks;

impl PlaybookCallbacks for ConsoleCallbacks {
    fn on_start(&mut self) {
        tracing::info!("PLAYBOOK START");
    }

    fn on_play_start(&mut self, name: &str) {
        tracing::info!(play = name, "PLAY");
    }

    fn on_setup(&mut self) {
        tracing::info!("GATHERING FACTS");
    }

    fn on_task_start(&mut self, name: &str, is_conditional: bool) {
        if is_conditional {
            tracing::info!(handler = name, "NOTIFIED");
        } else {
            tracing::info!(task = name, "TASK");
        }
    }

    fn on_no_hosts_matched(&mut self) {
        tracing::warn!("skipping: no hosts matched");
    }

    fn on_no_hosts_remaining(&mut self) {
        tracing::warn!("FATAL: all hosts have already failed -- aborting");
    }

    fn on_stats(&mut self, stats: &AggregateStats) {
        for (host, s) in stats.hosts() {
            tracing::info!(
                host,
                ok = s.ok,
                changed = s.changed,
                unreachable = s.unreachable,
                failed = s.failures,
                skipped = s.skipped,
                "PLAY RECAP",
            );
        }
    }

    fn on_vars_prompt(&mut self, name: &str) -> Result<String, EngineError> {
        tracing::error!(variable = name, "Cannot prompt for input without a terminal");
        Err(EngineError::InteractivePrompt(name.to_string()))
    }
}

impl RunnerCallbacks for ConsoleCallbacks {
    fn on_ok(&mut self, host: &str, changed: bool) {
        if changed {
            tracing::info!(host, "changed");
        } else {
            tracing::info!(host, "ok");
        }
    }

    fn on_failed(&mut self, host: &str) {
        tracing::warn!(host, "failed");
    }

    fn on_unreachable(&mut self, host: &str) {
        tracing::warn!(host, "unreachable");
    }

    fn on_skipped(&mut self, host: &str, item: Option<&str>) {
        tracing::info!(host, item, "skipping");
    }
}
