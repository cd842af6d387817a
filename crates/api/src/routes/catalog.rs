//! Inventory and playbook discovery routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// ```text
/// GET    /inventories     -> list_inventories
/// GET    /playbooks       -> list_playbooks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventories", get(catalog::list_inventories))
        .route("/playbooks", get(catalog::list_playbooks))
}
