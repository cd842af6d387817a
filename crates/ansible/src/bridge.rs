//! Translation of engine hooks into progress events.
//!
//! [`CallbackBridge`] implements both hook traits. Each invocation is turned
//! into exactly one [`ProgressEvent`] by [`translate`], pushed onto the run's
//! event channel, and then forwarded to the wrapped base behaviour so the
//! engine's own console narration is kept.
//!
//! [`translate`] is the only place that knows what a hook looks like in the
//! run log. New hooks get a [`Hook`] variant and a row there.

use runbook_core::run_status::{
    STATUS_GATHERING_FACTS, STATUS_RUNNING, STATUS_STARTING, STATUS_STOPPED,
};
use runbook_core::types::Severity;
use runbook_events::{EventSender, ProgressEvent};

use crate::callbacks::{ConsoleCallbacks, PlaybookCallbacks, RunnerCallbacks};
use crate::engine::EngineError;
use crate::stats::AggregateStats;

/// A hook invocation with the arguments that matter for the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook<'a> {
    Start,
    PlayStart { name: &'a str },
    Setup,
    TaskStart { name: &'a str, is_conditional: bool },
    HostOk { host: &'a str, changed: bool },
    HostFailed { host: &'a str },
    HostUnreachable { host: &'a str },
    HostSkipped { host: &'a str, item: Option<&'a str> },
    NoHostsMatched,
    NoHostsRemaining,
    Stats,
    VarsPrompt { name: &'a str },
}

/// Map a hook to its progress event.
pub fn translate(hook: Hook<'_>) -> ProgressEvent {
    match hook {
        Hook::Start => ProgressEvent::status(STATUS_STARTING),
        Hook::PlayStart { name } => ProgressEvent::message(format!("Play '{name}' started")),
        Hook::Setup => {
            ProgressEvent::message("Gather facts on hosts").with_status(STATUS_GATHERING_FACTS)
        }
        Hook::TaskStart {
            name,
            is_conditional: false,
        } => ProgressEvent::message(format!("Task '{name}' started")).with_status(STATUS_RUNNING),
        Hook::TaskStart {
            name,
            is_conditional: true,
        } => ProgressEvent::message(format!("Notification for '{name}' started"))
            .with_status(STATUS_RUNNING),
        Hook::HostOk {
            host,
            changed: true,
        } => ProgressEvent::log(format!("Changed - {host}"), Severity::Success),
        Hook::HostOk {
            host,
            changed: false,
        } => ProgressEvent::log(format!("OK - {host}"), Severity::Success),
        Hook::HostFailed { host } => ProgressEvent::log(format!("Failed - {host}"), Severity::Danger),
        Hook::HostUnreachable { host } => {
            ProgressEvent::log(format!("Error - {host}"), Severity::Danger)
        }
        Hook::HostSkipped { host, item: None } => {
            ProgressEvent::log(format!("Skipping: {host}"), Severity::Info)
        }
        Hook::HostSkipped {
            host,
            item: Some(item),
        } => ProgressEvent::log(format!("Skipping: {host} => (item={item})"), Severity::Info),
        Hook::NoHostsMatched => ProgressEvent::log("No hosts matched", Severity::Danger),
        Hook::NoHostsRemaining => ProgressEvent::log("No hosts remaining", Severity::Danger),
        Hook::Stats => ProgressEvent::status(STATUS_STOPPED),
        Hook::VarsPrompt { name } => ProgressEvent::log(
            format!("Interactive prompt for '{name}' is not supported"),
            Severity::Danger,
        ),
    }
}

/// Hook implementation that reports every invocation to the run's event
/// channel before delegating to `inner`.
#[derive(Debug, Clone)]
pub struct CallbackBridge<C = ConsoleCallbacks> {
    events: EventSender,
    inner: C,
}

impl CallbackBridge<ConsoleCallbacks> {
    /// Bridge onto the console base behaviour.
    pub fn new(events: EventSender) -> Self {
        Self::with_inner(events, ConsoleCallbacks)
    }
}

impl<C> CallbackBridge<C> {
    pub fn with_inner(events: EventSender, inner: C) -> Self {
        Self { events, inner }
    }

    fn emit(&self, hook: Hook<'_>) {
        if self.events.send(translate(hook)).is_err() {
            // Only happens if the run was superseded; the engine keeps going.
            tracing::debug!(?hook, "Progress channel closed, dropping event");
        }
    }
}

impl<C: PlaybookCallbacks> PlaybookCallbacks for CallbackBridge<C> {
    fn on_start(&mut self) {
        self.emit(Hook::Start);
        self.inner.on_start();
    }

    fn on_play_start(&mut self, name: &str) {
        self.emit(Hook::PlayStart { name });
        self.inner.on_play_start(name);
    }

    fn on_setup(&mut self) {
        self.emit(Hook::Setup);
        self.inner.on_setup();
    }

    fn on_task_start(&mut self, name: &str, is_conditional: bool) {
        self.emit(Hook::TaskStart {
            name,
            is_conditional,
        });
        self.inner.on_task_start(name, is_conditional);
    }

    fn on_no_hosts_matched(&mut self) {
        self.emit(Hook::NoHostsMatched);
        self.inner.on_no_hosts_matched();
    }

    fn on_no_hosts_remaining(&mut self) {
        self.emit(Hook::NoHostsRemaining);
        self.inner.on_no_hosts_remaining();
    }

    fn on_stats(&mut self, stats: &AggregateStats) {
        self.emit(Hook::Stats);
        self.inner.on_stats(stats);
    }

    /// Always fails: the base behaviour would try to read a terminal that a
    /// background run does not have, so it is not forwarded.
    fn on_vars_prompt(&mut self, name: &str) -> Result<String, EngineError> {
        self.emit(Hook::VarsPrompt { name });
        Err(EngineError::InteractivePrompt(name.to_string()))
    }
}

impl<C: RunnerCallbacks> RunnerCallbacks for CallbackBridge<C> {
    fn on_ok(&mut self, host: &str, changed: bool) {
        self.emit(Hook::HostOk { host, changed });
        self.inner.on_ok(host, changed);
    }

    fn on_failed(&mut self, host: &str) {
        self.emit(Hook::HostFailed { host });
        self.inner.on_failed(host);
    }

    fn on_unreachable(&mut self, host: &str) {
        self.emit(Hook::HostUnreachable { host });
        self.inner.on_unreachable(host);
    }

    fn on_skipped(&mut self, host: &str, item: Option<&str>) {
        self.emit(Hook::HostSkipped { host, item });
        self.inner.on_skipped(host, item);
    }
}
