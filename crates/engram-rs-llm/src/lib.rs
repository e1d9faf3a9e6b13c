//! Text-generation collaborator used for memory enhancement and summaries.

pub mod error;
pub mod openai;

/// Text-generation error type.
pub use error::LlmError;
/// OpenAI-compatible chat-completions client.
pub use openai::OpenAiGenerator;

use async_trait::async_trait;

#[async_trait]
/// Produces a text reply for a prompt.
///
/// Calls are point-to-point blocking requests with no implicit retry;
/// callers that need a timeout impose it around the call.
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
