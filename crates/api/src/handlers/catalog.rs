//! Inventory and playbook discovery.

use std::io;
use std::path::{Path, PathBuf};

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use runbook_core::listing;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/inventories
pub async fn list_inventories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let names = list_with(&state, listing::list_inventories).await?;
    Ok(Json(DataResponse { data: names }))
}

/// GET /api/v1/playbooks
pub async fn list_playbooks(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let names = list_with(&state, listing::list_playbooks).await?;
    Ok(Json(DataResponse { data: names }))
}

/// Run a directory listing off the async runtime.
async fn list_with(
    state: &AppState,
    list: fn(&Path) -> io::Result<Vec<String>>,
) -> AppResult<Vec<String>> {
    let base: PathBuf = state.resolver().base().to_path_buf();
    tokio::task::spawn_blocking(move || list(&base))
        .await?
        .map_err(|e| AppError::InternalError(format!("Failed to list playbook directory: {e}")))
}
