//! The automation engine capability driven by the job runner.
//!
//! The runner never looks inside an engine: it builds one through an
//! [`EngineFactory`], awaits [`PlaybookEngine::run`], then clears the
//! engine's host cache and drops it. Progress is only observed through the
//! hooks handed over in [`EngineHooks`].

use std::path::PathBuf;

use async_trait::async_trait;

use crate::callbacks::{PlaybookCallbacks, RunnerCallbacks};
use crate::stats::AggregateStats;

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSpec {
    /// Absolute, already-resolved inventory path.
    pub inventory_path: PathBuf,
    /// Absolute, already-resolved playbook path.
    pub playbook_path: PathBuf,
}

/// Hook receivers an engine reports to.
///
/// Playbook-level hooks (plays, tasks, stats) and per-host runner hooks are
/// separate objects, mirroring how ansible wires its callback plugins.
pub struct EngineHooks {
    pub playbook: Box<dyn PlaybookCallbacks>,
    pub runner: Box<dyn RunnerCallbacks>,
}

/// A single, already-configured playbook execution.
#[async_trait]
pub trait PlaybookEngine: Send {
    /// Execute the playbook to completion.
    ///
    /// Host-level failures are not errors: they are reported through the
    /// runner hooks and counted in the returned stats. An `Err` means the
    /// engine itself could not complete the run.
    async fn run(&mut self) -> Result<AggregateStats, EngineError>;

    /// Drop any per-host state (facts, last results) the engine retained.
    fn clear_host_cache(&mut self);
}

/// Builds engines for the runner.
pub trait EngineFactory: Send + Sync {
    fn build(
        &self,
        spec: EngineSpec,
        hooks: EngineHooks,
    ) -> Result<Box<dyn PlaybookEngine>, EngineError>;
}

/// Failures the engine reports as its own.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("Failed to spawn ansible-playbook: {0}")]
    Spawn(#[source] std::io::Error),

    /// Reading the engine's output failed mid-run.
    #[error("I/O error while reading engine output: {0}")]
    Io(#[from] std::io::Error),

    /// The engine exited with a code that does not mean "run completed".
    #[error("ansible-playbook exited with code {code}: {stderr}")]
    Exited { code: i32, stderr: String },

    /// The playbook asked for interactive input, which a background run
    /// cannot provide.
    #[error("Interactive prompt for '{0}' is not supported")]
    InteractivePrompt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exited_error_includes_code_and_stderr() {
        let err = EngineError::Exited {
            code: 4,
            stderr: "ERROR! the playbook could not be found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ansible-playbook exited with code 4: ERROR! the playbook could not be found"
        );
    }

    #[test]
    fn spawn_error_keeps_io_source() {
        let err = EngineError::Spawn(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("no such file"));
    }
}
