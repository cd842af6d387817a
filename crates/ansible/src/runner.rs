//! Single-flight playbook runner.
//!
//! [`JobRunner`] owns the one background execution slot. Starting a run
//! while the slot is occupied is rejected with [`CoreError::AlreadyRunning`]
//! and changes nothing. Otherwise the status is reset synchronously, before
//! the worker exists, so a new run's first event can never interleave with
//! the previous run's log.
//!
//! The worker is supervised: it runs as its own task and a supervisor task
//! awaits it. If the worker panics, the supervisor turns the panic into a
//! terminal `"Finished - Error"` status carrying the panic message.
//!
//! Runs cannot be cancelled. Once started, a run ends only when the engine
//! returns or fails.

use std::path::PathBuf;
use std::sync::Arc;

use runbook_core::error::CoreError;
use runbook_core::paths::DirectoryResolver;
use runbook_core::run_status::{
    STATUS_BEGINNING_RUN, STATUS_FINISHED, STATUS_FINISHED_ERROR, STATUS_INITIALIZING,
};
use runbook_core::types::{RunId, Severity};
use runbook_events::{EventSender, ProgressEvent, RunStatus, StatusAggregator};
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

use crate::bridge::CallbackBridge;
use crate::engine::{EngineError, EngineFactory, EngineHooks, EngineSpec, PlaybookEngine};

/// Log line emitted when a run completes normally.
pub const MSG_FINISHED: &str = "Finished execution";

/// Log line emitted when the engine reports a failure.
pub const MSG_ENGINE_ERROR: &str = "Unknown ansible error occurred";

/// Prefix of the log line emitted when the worker dies unexpectedly.
pub const MSG_WORKER_FAILURE_PREFIX: &str = "Unexpected worker failure";

/// Everything a run needs from the outside world.
pub struct RunnerContext {
    /// Resolves inventory and playbook names inside the playbook directory.
    pub resolver: DirectoryResolver,
    /// Builds the engine for each run.
    pub factory: Arc<dyn EngineFactory>,
}

/// A validated run request handed to the worker.
struct RunRequest {
    run_id: RunId,
    inventory_path: PathBuf,
    playbook_path: PathBuf,
}

/// Owns the background execution slot and the status of the latest run.
///
/// Shared via `Arc<JobRunner>` between request handlers.
pub struct JobRunner {
    context: Arc<RunnerContext>,
    aggregator: Arc<StatusAggregator>,
    /// Supervisor task of the current or most recent run.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JobRunner {
    pub fn new(context: RunnerContext) -> Self {
        Self {
            context: Arc::new(context),
            aggregator: Arc::new(StatusAggregator::new()),
            worker: Mutex::new(None),
        }
    }

    /// The playbook directory runs are resolved against.
    pub fn resolver(&self) -> &DirectoryResolver {
        &self.context.resolver
    }

    /// Start a run of `playbook` against `inventory`.
    ///
    /// Returns as soon as the worker is spawned; progress is observed via
    /// [`status`](Self::status). Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`CoreError::AlreadyRunning`] if a worker is still alive.
    /// - [`CoreError::PathEscape`] if either name resolves outside the
    ///   playbook directory.
    ///
    /// Neither error touches the current status.
    pub async fn start(&self, inventory: &str, playbook: &str) -> Result<RunId, CoreError> {
        let mut worker = self.worker.lock().await;
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::warn!(inventory, playbook, "Run rejected, another run is in progress");
            return Err(CoreError::AlreadyRunning);
        }

        let inventory_path = self.context.resolver.resolve(inventory)?;
        let playbook_path = self.context.resolver.resolve(playbook)?;

        let run_id = RunId::new_v4();
        let events = self.aggregator.reset(run_id).await;
        let request = RunRequest {
            run_id,
            inventory_path,
            playbook_path,
        };

        let span = tracing::info_span!("playbook_run", %run_id);
        let context = Arc::clone(&self.context);
        *worker = Some(tokio::spawn(supervise(context, events, request).instrument(span)));

        tracing::info!(%run_id, inventory, playbook, "Playbook run started");
        Ok(run_id)
    }

    /// Snapshot of the current run's status.
    pub async fn status(&self) -> RunStatus {
        self.aggregator.snapshot().await
    }

    /// Whether a worker is currently alive.
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Outermost boundary of a run: converts a worker panic into a terminal
/// status instead of losing it.
async fn supervise(context: Arc<RunnerContext>, events: EventSender, request: RunRequest) {
    let run_id = request.run_id;
    let worker = tokio::spawn(execute(context, events.clone(), request).in_current_span());

    match worker.await {
        Ok(()) => tracing::debug!(%run_id, "Playbook worker exited"),
        Err(err) => {
            let detail = failure_detail(err);
            tracing::error!(%run_id, error = %detail, "Playbook worker failed unexpectedly");
            emit(
                &events,
                ProgressEvent::log(
                    format!("{MSG_WORKER_FAILURE_PREFIX}: {detail}"),
                    Severity::Danger,
                )
                .with_status(STATUS_FINISHED_ERROR),
            );
        }
    }
}

/// Body of the worker task.
async fn execute(context: Arc<RunnerContext>, events: EventSender, request: RunRequest) {
    emit(&events, ProgressEvent::status(STATUS_INITIALIZING));

    let spec = EngineSpec {
        inventory_path: request.inventory_path,
        playbook_path: request.playbook_path,
    };
    let hooks = EngineHooks {
        playbook: Box::new(CallbackBridge::new(events.clone())),
        runner: Box::new(CallbackBridge::new(events.clone())),
    };

    let inventory_line = format!("Using inventory: {}", spec.inventory_path.display());
    let playbook_line = format!("Using playbook: {}", spec.playbook_path.display());

    let engine = match context.factory.build(spec, hooks) {
        Ok(engine) => engine,
        Err(e) => {
            report_engine_failure(&events, &e);
            return;
        }
    };

    emit(&events, ProgressEvent::log(inventory_line, Severity::Info));
    emit(&events, ProgressEvent::log(playbook_line, Severity::Info));
    emit(&events, ProgressEvent::status(STATUS_BEGINNING_RUN));

    let outcome = run_to_completion(engine).await;

    match outcome {
        Ok(()) => {
            tracing::info!("Playbook run finished");
            emit(
                &events,
                ProgressEvent::log(MSG_FINISHED, Severity::Success).with_status(STATUS_FINISHED),
            );
        }
        Err(e) => report_engine_failure(&events, &e),
    }
}

/// Owns the engine for the duration of a run and clears its host cache when
/// dropped, including while unwinding from a panic.
struct EngineGuard(Box<dyn PlaybookEngine>);

impl Drop for EngineGuard {
    fn drop(&mut self) {
        self.0.clear_host_cache();
    }
}

/// Run the engine, then clear its host cache and release it whatever the
/// outcome.
async fn run_to_completion(engine: Box<dyn PlaybookEngine>) -> Result<(), EngineError> {
    let mut guard = EngineGuard(engine);
    let outcome = guard.0.run().await;
    drop(guard);

    let stats = outcome?;
    tracing::debug!(hosts = stats.host_count(), failed = stats.has_failures(), "Engine released");
    Ok(())
}

fn report_engine_failure(events: &EventSender, error: &EngineError) {
    tracing::error!(error = %error, "Playbook run failed");
    emit(
        events,
        ProgressEvent::log(MSG_ENGINE_ERROR, Severity::Danger).with_status(STATUS_FINISHED_ERROR),
    );
}

fn emit(events: &EventSender, event: ProgressEvent) {
    if events.send(event).is_err() {
        tracing::debug!("Progress channel closed, dropping event");
    }
}

/// Human-readable description of why a worker task ended abnormally.
fn failure_detail(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
