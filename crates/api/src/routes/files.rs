//! Route definitions for editing files in the playbook directory.

use axum::routing::get;
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// Routes mounted at `/files`.
///
/// ```text
/// GET    /{*path}         -> read_file
/// PUT    /{*path}         -> save_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{*path}", get(files::read_file).put(files::save_file))
}
