//! Engine facade: orchestration over storage and collaborators.

use log::{debug, info};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use engram_rs_config::{
    EmbeddingProviderKind, EngramConfig, LlmProviderKind, StorageBackendKind,
};
use engram_rs_embedding::{EmbeddingProvider, HashingEmbedder, OpenAiEmbeddings};
use engram_rs_llm::{OpenAiGenerator, TextGenerator};
use engram_rs_memory::model::{
    METADATA_CATEGORY_KEY, METADATA_DATA_KEY, validate_text, validate_user_id,
};
use engram_rs_memory::{
    EphemeralMemoryStore, FileMemoryStore, MemoryError, MemoryRecord, MemoryStore, MemoryView,
    ScoredMemory, SqliteMemoryStore, similarity,
};

/// Memory engine: the public operation surface.
///
/// Persistence goes through the injected backend; embedding and ranking
/// happen here, so backends stay pure storage. Returned records are copies
/// of persisted state, never live references.
pub struct MemoryEngine {
    store: Arc<dyn MemoryStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("has_generator", &self.generator.is_some())
            .finish_non_exhaustive()
    }
}

impl MemoryEngine {
    /// Bind a storage backend and an embedding provider.
    pub fn new(store: Arc<dyn MemoryStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            generator: None,
        }
    }

    /// Attach a text generator for enhancement and summaries.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the full stack from configuration.
    pub fn from_config(config: &EngramConfig) -> Result<Self, MemoryError> {
        let store: Arc<dyn MemoryStore> = match config.storage.backend {
            StorageBackendKind::Disk => {
                Arc::new(FileMemoryStore::new(config.storage.resolved_path())?)
            }
            StorageBackendKind::Sqlite => {
                Arc::new(SqliteMemoryStore::new(config.storage.resolved_path())?)
            }
            StorageBackendKind::Ephemeral => Arc::new(EphemeralMemoryStore::new()),
        };

        let embedder: Arc<dyn EmbeddingProvider> = match config.embedding.provider {
            EmbeddingProviderKind::Hashing => {
                Arc::new(HashingEmbedder::with_dimensions(config.embedding.dimensions))
            }
            EmbeddingProviderKind::Openai => {
                let api_key = config.embedding.api_key.clone().ok_or_else(|| {
                    MemoryError::Validation(
                        "embedding api key missing; set embedding.api_key or OPENAI_API_KEY"
                            .to_string(),
                    )
                })?;
                let mut client = OpenAiEmbeddings::new(api_key);
                if let Some(model) = &config.embedding.model {
                    client = client.with_model(model);
                }
                if let Some(base_url) = &config.embedding.base_url {
                    client = client.with_base_url(base_url);
                }
                Arc::new(client)
            }
        };

        let generator: Option<Arc<dyn TextGenerator>> = match &config.llm {
            None => None,
            Some(llm) => {
                let api_key = llm.api_key.clone().ok_or_else(|| {
                    MemoryError::Validation(
                        "llm api key missing; set llm.api_key or OPENAI_API_KEY".to_string(),
                    )
                })?;
                let client = match llm.provider {
                    LlmProviderKind::Openai => {
                        let mut client = OpenAiGenerator::new(api_key)
                            .with_model(&llm.model)
                            .with_temperature(llm.temperature)
                            .with_max_tokens(llm.max_tokens);
                        if let Some(base_url) = &llm.base_url {
                            client = client.with_base_url(base_url);
                        }
                        client
                    }
                };
                Some(Arc::new(client))
            }
        };

        let mut engine = Self::new(store, embedder);
        engine.generator = generator;
        Ok(engine)
    }

    /// Embed text, mapping provider failures into the engine taxonomy.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        self.embedder
            .embed(text)
            .await
            .map_err(|err| MemoryError::Collaborator(err.to_string()))
    }

    /// The configured generator, or a collaborator error.
    fn generator(&self) -> Result<&Arc<dyn TextGenerator>, MemoryError> {
        self.generator.as_ref().ok_or_else(|| {
            MemoryError::Collaborator("no text generator configured".to_string())
        })
    }

    /// Embed `text`, persist it under a fresh id, and return the record.
    ///
    /// Two calls with identical text create two distinct records.
    pub async fn add(
        &self,
        text: &str,
        user_id: &str,
        metadata: Option<Map<String, Value>>,
    ) -> Result<MemoryRecord, MemoryError> {
        validate_text(text)?;
        validate_user_id(user_id)?;
        let vector = self.embed(text).await?;
        let record = MemoryRecord::new(text, user_id, metadata, vector)?;
        self.store.insert(record.clone())?;
        info!("added memory (user_id={}, id={})", user_id, record.id);
        Ok(record)
    }

    /// All records for the namespace, vectors withheld, earliest first.
    pub fn get_all(&self, user_id: &str) -> Result<Vec<MemoryView>, MemoryError> {
        validate_user_id(user_id)?;
        let records = self.store.list(user_id)?;
        Ok(records.iter().map(MemoryRecord::to_view).collect())
    }

    /// Rank the namespace against `query` and return the top matches.
    ///
    /// Results are ordered by descending similarity; ties keep the
    /// earlier-created record first.
    pub async fn search(
        &self,
        query: &str,
        user_id: &str,
        num_results: usize,
    ) -> Result<Vec<ScoredMemory>, MemoryError> {
        validate_user_id(user_id)?;
        if num_results < 1 {
            return Err(MemoryError::InvalidArgument(
                "num_results must be at least 1".to_string(),
            ));
        }
        let vector = self.embed(query).await?;
        let candidates = self.store.list(user_id)?;
        let ranked = similarity::rank(&vector, candidates, num_results);
        debug!(
            "search (user_id={}, num_results={}, returned={})",
            user_id,
            num_results,
            ranked.len()
        );
        Ok(ranked
            .into_iter()
            .map(|(record, score)| ScoredMemory {
                memory: record.to_view(),
                score,
            })
            .collect())
    }

    /// Replace a record's text (and optionally metadata), re-embedding it.
    ///
    /// `id`, `user_id`, and `created_at` stay unchanged; the metadata
    /// `data` mirror is refreshed to the new text.
    pub async fn update(
        &self,
        id: Uuid,
        new_text: &str,
        user_id: &str,
        metadata: Option<Map<String, Value>>,
    ) -> Result<MemoryRecord, MemoryError> {
        validate_text(new_text)?;
        validate_user_id(user_id)?;
        let Some(mut record) = self.store.get(user_id, id)? else {
            return Err(MemoryError::NotFound {
                id,
                user_id: user_id.to_string(),
            });
        };
        record.vector = self.embed(new_text).await?;
        record.text = new_text.to_string();
        if let Some(metadata) = metadata {
            record.metadata = metadata;
        }
        record.metadata.insert(
            METADATA_DATA_KEY.to_string(),
            Value::String(new_text.to_string()),
        );
        self.store.replace(record.clone())?;
        info!("updated memory (user_id={}, id={})", user_id, id);
        Ok(record)
    }

    /// Remove one record.
    pub fn delete(&self, id: Uuid, user_id: &str) -> Result<(), MemoryError> {
        validate_user_id(user_id)?;
        self.store.remove(user_id, id)?;
        info!("deleted memory (user_id={}, id={})", user_id, id);
        Ok(())
    }

    /// Remove every record for the namespace. Succeeds when already empty.
    pub fn delete_all(&self, user_id: &str) -> Result<(), MemoryError> {
        validate_user_id(user_id)?;
        self.store.remove_user(user_id)
    }

    /// Remove every record across all namespaces.
    pub fn reset(&self) -> Result<(), MemoryError> {
        info!("resetting memory store");
        self.store.clear()
    }

    /// Rewrite a stored record through the text generator.
    ///
    /// The stored record is only touched after the generator returns usable
    /// text; any collaborator failure surfaces without mutating it.
    pub async fn enhance_memory(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<MemoryRecord, MemoryError> {
        validate_user_id(user_id)?;
        let generator = self.generator()?;
        let Some(record) = self.store.get(user_id, id)? else {
            return Err(MemoryError::NotFound {
                id,
                user_id: user_id.to_string(),
            });
        };
        let prompt = enhance_prompt(&record);
        let enhanced = generator
            .generate(&prompt)
            .await
            .map_err(|err| MemoryError::Collaborator(err.to_string()))?;
        if enhanced.trim().is_empty() {
            return Err(MemoryError::Collaborator(
                "generator returned an empty enhancement".to_string(),
            ));
        }
        self.update(id, &enhanced, user_id, None).await
    }

    /// Summarize every record in the namespace without mutating stored data.
    pub async fn generate_summary(&self, user_id: &str) -> Result<String, MemoryError> {
        validate_user_id(user_id)?;
        let generator = self.generator()?;
        let texts: Vec<String> = self
            .store
            .list(user_id)?
            .into_iter()
            .map(|record| record.text)
            .collect();
        let prompt = format!("Summarize the following memories:\n\n{}", texts.join("\n"));
        generator
            .generate(&prompt)
            .await
            .map_err(|err| MemoryError::Collaborator(err.to_string()))
    }
}

/// Prompt for enhancing one stored record.
fn enhance_prompt(record: &MemoryRecord) -> String {
    let mut prompt = format!(
        "Enhance the following memory with additional relevant details:\n\n{}",
        record.text
    );
    if let Some(category) = record
        .metadata
        .get(METADATA_CATEGORY_KEY)
        .and_then(Value::as_str)
    {
        prompt.push_str(&format!("\n\nCategory: {category}"));
    }
    prompt
}
