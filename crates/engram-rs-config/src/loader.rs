//! Config loading: JSON5 file plus environment fallback for API keys.

use log::debug;
use std::path::Path;

use crate::error::ConfigError;
use crate::model::EngramConfig;

/// Environment variable consulted when a config omits an API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Load and validate a config file, resolving environment fallbacks.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngramConfig, ConfigError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let value: serde_json::Value = json5::from_str(&raw)?;
    let mut config: EngramConfig = serde_json::from_value(value)?;
    apply_api_key_fallback(&mut config, env_api_key());
    config.validate()?;
    debug!("loaded config (path={})", path.as_ref().display());
    Ok(config)
}

/// Default config with environment fallbacks applied.
pub fn default_config() -> EngramConfig {
    let mut config = EngramConfig::default();
    apply_api_key_fallback(&mut config, env_api_key());
    config
}

fn env_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Fill missing API keys from the resolved environment value.
fn apply_api_key_fallback(config: &mut EngramConfig, api_key: Option<String>) {
    if config.embedding.api_key.is_none() {
        config.embedding.api_key = api_key.clone();
    }
    if let Some(llm) = config.llm.as_mut() {
        if llm.api_key.is_none() {
            llm.api_key = api_key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_api_key_fallback, load_config};
    use crate::model::{EngramConfig, LlmConfig, StorageBackendKind};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn load_config_parses_json5_with_comments() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("engram.json5");
        let mut file = std::fs::File::create(&path).expect("create");
        write!(
            file,
            "{{\n  // storage section\n  storage: {{ backend: 'sqlite', path: 'memories.db' }},\n  llm: {{ model: 'gpt-4o-mini', temperature: 0.2, max_tokens: 1500, api_key: 'k' }},\n}}"
        )
        .expect("write");

        let config = load_config(&path).expect("load");
        assert_eq!(config.storage.backend, StorageBackendKind::Sqlite);
        assert_eq!(config.storage.resolved_path(), "memories.db");
        assert_eq!(config.llm.expect("llm").model, "gpt-4o-mini");
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("engram.json5");
        std::fs::write(&path, "{ llm: { temperature: 2.0, api_key: 'k' } }").expect("write");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn fallback_fills_only_missing_api_keys() {
        let mut config = EngramConfig {
            llm: Some(LlmConfig {
                api_key: Some("explicit".to_string()),
                ..LlmConfig::default()
            }),
            ..EngramConfig::default()
        };
        apply_api_key_fallback(&mut config, Some("from-env".to_string()));

        assert_eq!(config.embedding.api_key.as_deref(), Some("from-env"));
        assert_eq!(
            config.llm.expect("llm").api_key.as_deref(),
            Some("explicit")
        );
    }

    #[test]
    fn fallback_leaves_keys_absent_without_an_environment_value() {
        let mut config = EngramConfig::default();
        apply_api_key_fallback(&mut config, None);
        assert_eq!(config.embedding.api_key, None);
    }
}
