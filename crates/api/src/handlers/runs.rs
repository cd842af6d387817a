//! Handlers for the `/runs` resource.
//!
//! A run executes in the background; the start endpoint returns as soon as
//! the worker is spawned and clients poll `/runs/status` for progress.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use runbook_core::error::CoreError;
use runbook_core::types::RunId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for starting a run. Both names are relative to the
/// playbook directory.
#[derive(Debug, Deserialize)]
pub struct StartRun {
    pub inventory: String,
    pub playbook: String,
}

#[derive(Debug, Serialize)]
pub struct RunAccepted {
    pub accepted: bool,
    pub run_id: RunId,
}

/// POST /api/v1/runs
///
/// Start a playbook run. Returns 202 with the run id, 409 if a run is
/// already in progress, 403 if a name escapes the playbook directory.
pub async fn start_run(
    State(state): State<AppState>,
    Json(input): Json<StartRun>,
) -> AppResult<impl IntoResponse> {
    let inventory = input.inventory.trim();
    let playbook = input.playbook.trim();
    if inventory.is_empty() || playbook.is_empty() {
        return Err(CoreError::Validation(
            "inventory and playbook are required".to_string(),
        )
        .into());
    }

    let run_id = state.runner.start(inventory, playbook).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: RunAccepted {
                accepted: true,
                run_id,
            },
        }),
    ))
}

/// GET /api/v1/runs/status
///
/// Status and cumulative log of the current (or most recent) run.
pub async fn run_status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let status = state.runner.status().await;
    Ok(Json(DataResponse { data: status }))
}
