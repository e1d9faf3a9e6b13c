//! Embedding provider fakes.

use async_trait::async_trait;
use engram_rs_embedding::{EmbeddingError, EmbeddingProvider};

/// Embedder returning the same vector for every input.
#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    /// Create a fake that always returns `vector`.
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.vector.len())
    }
}

/// Embedder that fails every call.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 503,
            message: "embedding backend offline".to_string(),
        })
    }
}
