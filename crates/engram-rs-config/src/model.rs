//! Configuration schema models.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default file-store path.
pub const DEFAULT_DISK_PATH: &str = "engram_data.json";

/// Default SQLite database path.
pub const DEFAULT_SQLITE_PATH: &str = "engram.db";

/// Top-level configuration passed into the engine constructors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngramConfig {
    /// Storage backend selection.
    pub storage: StorageConfig,
    /// Embedding provider selection.
    pub embedding: EmbeddingConfig,
    /// Optional text-generation settings; enhancement and summaries are
    /// unavailable without them.
    pub llm: Option<LlmConfig>,
}

impl EngramConfig {
    /// Validate field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.dimensions == 0 {
            return Err(ConfigError::InvalidField {
                path: "embedding.dimensions".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(llm) = &self.llm {
            if !(0.0..=1.0).contains(&llm.temperature) {
                return Err(ConfigError::InvalidField {
                    path: "llm.temperature".to_string(),
                    message: "must be within [0, 1]".to_string(),
                });
            }
            if llm.max_tokens == 0 {
                return Err(ConfigError::InvalidField {
                    path: "llm.max_tokens".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Storage backend variants.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// File-backed JSON store.
    #[default]
    Disk,
    /// SQLite-backed store.
    Sqlite,
    /// In-memory store, lost on exit.
    Ephemeral,
}

/// Storage backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend variant to construct.
    pub backend: StorageBackendKind,
    /// Store path; a backend-specific default applies when omitted.
    pub path: Option<String>,
}

impl StorageConfig {
    /// Effective path for the selected backend.
    pub fn resolved_path(&self) -> &str {
        match (&self.path, self.backend) {
            (Some(path), _) => path,
            (None, StorageBackendKind::Sqlite) => DEFAULT_SQLITE_PATH,
            (None, _) => DEFAULT_DISK_PATH,
        }
    }
}

/// Embedding provider variants.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Deterministic local hashed bag-of-words.
    #[default]
    Hashing,
    /// OpenAI-compatible embeddings API.
    Openai,
}

/// Embedding provider selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which provider to construct.
    pub provider: EmbeddingProviderKind,
    /// Vector width for the hashing provider.
    pub dimensions: usize,
    /// Model override for the API provider.
    pub model: Option<String>,
    /// Endpoint override for OpenAI-compatible servers.
    pub base_url: Option<String>,
    /// API key; falls back to the environment when omitted.
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            dimensions: 100,
            model: None,
            base_url: None,
            api_key: None,
        }
    }
}

/// Text-generation provider variants.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// OpenAI-compatible chat-completions API.
    #[default]
    Openai,
}

/// Text-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Which provider to construct.
    pub provider: LlmProviderKind,
    /// Model identifier.
    pub model: String,
    /// Sampling randomness in [0, 1].
    pub temperature: f32,
    /// Output length cap.
    pub max_tokens: u32,
    /// Endpoint override for OpenAI-compatible servers.
    pub base_url: Option<String>,
    /// API key; falls back to the environment when omitted.
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 1500,
            base_url: None,
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_DISK_PATH, DEFAULT_SQLITE_PATH, EngramConfig, LlmConfig, StorageBackendKind,
        StorageConfig,
    };
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_select_disk_storage_and_hashing_embeddings() {
        let config = EngramConfig::default();
        assert_eq!(config.storage.backend, StorageBackendKind::Disk);
        assert_eq!(config.storage.resolved_path(), DEFAULT_DISK_PATH);
        assert_eq!(config.embedding.dimensions, 100);
        assert_eq!(config.llm, None);
        config.validate().expect("valid");
    }

    #[test]
    fn sqlite_backend_resolves_its_own_default_path() {
        let storage = StorageConfig {
            backend: StorageBackendKind::Sqlite,
            path: None,
        };
        assert_eq!(storage.resolved_path(), DEFAULT_SQLITE_PATH);

        let storage = StorageConfig {
            backend: StorageBackendKind::Sqlite,
            path: Some("custom.db".to_string()),
        };
        assert_eq!(storage.resolved_path(), "custom.db");
    }

    #[test]
    fn llm_defaults_match_the_recognized_fields() {
        let llm = LlmConfig::default();
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.temperature, 0.2);
        assert_eq!(llm.max_tokens, 1500);
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let config = EngramConfig {
            llm: Some(LlmConfig {
                temperature: 1.5,
                ..LlmConfig::default()
            }),
            ..EngramConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref path, .. } if path == "llm.temperature"));
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        let mut config = EngramConfig::default();
        config.embedding.dimensions = 0;
        assert!(config.validate().is_err());
    }
}
