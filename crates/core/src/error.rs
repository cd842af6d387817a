#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("A playbook run is already in progress")]
    AlreadyRunning,

    #[error("Path escapes the playbook directory: {path}")]
    PathEscape { path: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
