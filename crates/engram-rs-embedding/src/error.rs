//! Error types for embedding providers.

/// Errors returned by embedding providers.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The embedding request could not be sent or read.
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The embedding service rejected the request.
    #[error("embedding api error (status={status}): {message}")]
    Api { status: u16, message: String },
    /// The embedding response carried no vector.
    #[error("embedding response carried no vector")]
    Empty,
}
