//! Route definitions for the `/runs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Routes mounted at `/runs`.
///
/// ```text
/// POST   /                -> start_run
/// GET    /status          -> run_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(runs::start_run))
        .route("/status", get(runs::run_status))
}
