use std::sync::Arc;

use runbook_ansible::runner::JobRunner;
use runbook_core::paths::DirectoryResolver;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Single-flight playbook runner and its status.
    pub runner: Arc<JobRunner>,
}

impl AppState {
    /// Resolver scoped to the playbook directory.
    pub fn resolver(&self) -> &DirectoryResolver {
        self.runner.resolver()
    }
}
