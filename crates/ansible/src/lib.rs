//! Ansible playbook execution core.
//!
//! Runs one playbook at a time in a supervised background task and turns
//! the engine's progress hooks into [`runbook_events::ProgressEvent`]s.
//!
//! - [`callbacks`]: the hook traits an engine drives, plus the console
//!   base behaviour.
//! - [`bridge`]: [`bridge::CallbackBridge`], the single translation table
//!   from hooks to progress events.
//! - [`engine`]: the opaque engine capability ([`engine::PlaybookEngine`],
//!   [`engine::EngineFactory`]) and its error type.
//! - [`playbook`]: the `ansible-playbook` subprocess engine.
//! - [`messages`]: typed parsing of the JSON-lines stdout callback.
//! - [`runner`]: [`runner::JobRunner`], the single-flight run slot.
//! - [`stats`]: per-host counters collected during a run.

pub mod bridge;
pub mod callbacks;
pub mod engine;
pub mod messages;
pub mod playbook;
pub mod runner;
pub mod stats;
