//! Error types for memory storage and the engine facade.

use uuid::Uuid;

/// Errors returned by storage backends and the memory engine.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// A required field was empty or missing.
    #[error("validation failed: {0}")]
    Validation(String),
    /// No record with this id exists under the namespace.
    #[error("memory {id} not found for user {user_id}")]
    NotFound { id: Uuid, user_id: String },
    /// A malformed call parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// File access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// (De)serializing persisted records failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Database access failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An embedding or generation collaborator failed.
    #[error("collaborator error: {0}")]
    Collaborator(String),
}
