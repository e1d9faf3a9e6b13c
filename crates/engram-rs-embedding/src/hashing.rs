//! Deterministic local embedding strategy.

use async_trait::async_trait;
use regex::Regex;
use std::hash::{Hash, Hasher};

use crate::error::EmbeddingError;
use crate::EmbeddingProvider;

/// Default vector width.
pub const DEFAULT_DIMENSIONS: usize = 100;

/// Hashed bag-of-words embedder.
///
/// Lowercases the input, strips non-alphanumeric characters, hashes each
/// token into a fixed-width bucket vector, and L2-normalizes the result.
/// The hasher uses fixed keys, so identical text embeds identically across
/// processes and persisted vectors stay valid.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    strip: Regex,
}

impl HashingEmbedder {
    /// Create an embedder with the default width.
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_DIMENSIONS)
    }

    /// Create an embedder with a custom width.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            strip: Regex::new(r"[^a-z0-9\s]").expect("static pattern"),
        }
    }

    /// Normalize text into lowercase alphanumeric tokens.
    fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = self.strip.replace_all(&lowered, "");
        stripped
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Embed synchronously. The async trait method delegates here.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in self.tokens(text) {
            let mut hasher = std::hash::DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
