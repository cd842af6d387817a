use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runbook_ansible::playbook::{AnsibleCommand, AnsiblePlaybookFactory};
use runbook_ansible::runner::{JobRunner, RunnerContext};
use runbook_api::config::ServerConfig;
use runbook_api::router::build_app_router;
use runbook_api::state::AppState;
use runbook_core::paths::DirectoryResolver;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        host = %config.host,
        port = %config.port,
        playbook_dir = %config.playbook_dir.display(),
        debug = config.debug,
        "Loaded server configuration",
    );

    // --- Playbook directory ---
    let resolver = DirectoryResolver::new(&config.playbook_dir)
        .unwrap_or_else(|e| panic!("Invalid PLAYBOOK_DIR: {e}"));
    tracing::info!(base = %resolver.base().display(), "Playbook directory resolved");

    // --- Engine ---
    let command = AnsibleCommand::parse(&config.ansible_command)
        .expect("ANSIBLE_PLAYBOOK_BIN must not be empty");
    let runner = Arc::new(JobRunner::new(RunnerContext {
        resolver,
        factory: Arc::new(AnsiblePlaybookFactory::new(command)),
    }));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        runner: Arc::clone(&runner),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown ---
    if runner.is_running().await {
        tracing::warn!("A playbook run is still active and will be abandoned");
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
