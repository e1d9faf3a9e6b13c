//! Error types for text generation.

/// Errors returned by text generators.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The generation request could not be sent or read.
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The generation service rejected the request.
    #[error("generation api error (status={status}): {message}")]
    Api { status: u16, message: String },
    /// The reply carried no usable text.
    #[error("generation response carried no text")]
    EmptyResponse,
}
