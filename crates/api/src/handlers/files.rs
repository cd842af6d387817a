//! Read and save files in the playbook directory.
//!
//! Every path goes through the runner's [`DirectoryResolver`] first, so
//! traversal and symlinks leading outside the directory are rejected with
//! 403 before the filesystem is touched.
//!
//! [`DirectoryResolver`]: runbook_core::paths::DirectoryResolver

use std::io;
use std::path::Path as FsPath;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use runbook_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FileContent {
    /// The path as requested, relative to the playbook directory.
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveFile {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct FileSaved {
    pub path: String,
    pub bytes_written: usize,
}

/// GET /api/v1/files/{*path}
pub async fn read_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> AppResult<impl IntoResponse> {
    let resolved = state.resolver().resolve(&path)?;

    let is_file = tokio::fs::metadata(&resolved)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(CoreError::NotFound(format!("file '{path}'")).into());
    }

    let content = tokio::fs::read_to_string(&resolved)
        .await
        .map_err(|e| io_error(&path, e))?;

    Ok(Json(DataResponse {
        data: FileContent { path, content },
    }))
}

/// PUT /api/v1/files/{*path}
///
/// Create or overwrite a file. The parent directory must already exist.
pub async fn save_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Json(input): Json<SaveFile>,
) -> AppResult<impl IntoResponse> {
    let resolved = state.resolver().resolve(&path)?;

    if is_dir(&resolved).await {
        return Err(CoreError::Validation(format!("'{path}' is a directory")).into());
    }
    let parent_exists = match resolved.parent() {
        Some(parent) => is_dir(parent).await,
        None => false,
    };
    if !parent_exists {
        return Err(CoreError::NotFound(format!("parent directory of '{path}'")).into());
    }

    tokio::fs::write(&resolved, input.content.as_bytes())
        .await
        .map_err(|e| io_error(&path, e))?;

    tracing::info!(path = %path, bytes = input.content.len(), "File saved");

    Ok(Json(DataResponse {
        data: FileSaved {
            path,
            bytes_written: input.content.len(),
        },
    }))
}

async fn is_dir(path: &FsPath) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

fn io_error(path: &str, err: io::Error) -> AppError {
    match err.kind() {
        io::ErrorKind::NotFound => CoreError::NotFound(format!("file '{path}'")).into(),
        io::ErrorKind::InvalidData => {
            CoreError::Validation(format!("'{path}' is not valid UTF-8")).into()
        }
        _ => AppError::InternalError(format!("I/O error on '{path}': {err}")),
    }
}
