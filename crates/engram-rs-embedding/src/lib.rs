//! Embedding providers for Engram memory records.

pub mod error;
pub mod hashing;
pub mod openai;

/// Embedding error type.
pub use error::EmbeddingError;
/// Deterministic local embedder.
pub use hashing::HashingEmbedder;
/// OpenAI-compatible embeddings client.
pub use openai::OpenAiEmbeddings;

use async_trait::async_trait;

#[async_trait]
/// Converts text into a numeric vector usable for similarity ranking.
///
/// Repeated calls on identical text must yield vectors usable for
/// consistent ranking; drift invalidates persisted vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Expected vector width, when the provider knows it.
    fn dimensions(&self) -> Option<usize> {
        None
    }
}
