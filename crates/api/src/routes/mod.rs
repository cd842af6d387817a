pub mod catalog;
pub mod files;
pub mod health;
pub mod runs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /runs                      start a run (POST)
/// /runs/status               current run status
///
/// /inventories               inventory names
/// /playbooks                 playbook names
///
/// /files/{*path}             read (GET), save (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/runs", runs::router())
        .merge(catalog::router())
        .nest("/files", files::router())
}
