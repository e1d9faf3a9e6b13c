//! Memory record model and result views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::MemoryError;

/// Metadata key carrying a mirror of the record text.
pub const METADATA_DATA_KEY: &str = "data";

/// Metadata key carrying the caller-assigned category.
pub const METADATA_CATEGORY_KEY: &str = "category";

/// Persisted memory record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier, unique within a namespace.
    pub id: Uuid,
    /// Owning namespace.
    pub user_id: String,
    /// Stored content.
    pub text: String,
    /// Caller metadata plus the derived `data` mirror of `text`.
    pub metadata: Map<String, Value>,
    /// Embedding of `text`; recomputed whenever `text` changes.
    pub vector: Vec<f32>,
    /// Creation timestamp; recovers insertion order for ranking ties.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Build a record with a fresh id, validating required fields.
    pub fn new(
        text: impl Into<String>,
        user_id: impl Into<String>,
        metadata: Option<Map<String, Value>>,
        vector: Vec<f32>,
    ) -> Result<Self, MemoryError> {
        let text = text.into();
        let user_id = user_id.into();
        validate_text(&text)?;
        validate_user_id(&user_id)?;
        let mut metadata = metadata.unwrap_or_default();
        metadata.insert(METADATA_DATA_KEY.to_string(), Value::String(text.clone()));
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            text,
            metadata,
            vector,
            created_at: Utc::now(),
        })
    }

    /// Vectorless projection returned to callers by listing operations.
    pub fn to_view(&self) -> MemoryView {
        MemoryView {
            id: self.id,
            text: self.text.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
        }
    }
}

/// Record view without the embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryView {
    /// Record identifier.
    pub id: Uuid,
    /// Stored content.
    pub text: String,
    /// Record metadata.
    pub metadata: Map<String, Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Search result: a record view with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredMemory {
    /// The matched record.
    pub memory: MemoryView,
    /// Cosine similarity to the query embedding.
    pub score: f32,
}

/// Reject an empty `text` field.
pub fn validate_text(text: &str) -> Result<(), MemoryError> {
    if text.trim().is_empty() {
        return Err(MemoryError::Validation("text must not be empty".to_string()));
    }
    Ok(())
}

/// Reject an empty `user_id` field.
pub fn validate_user_id(user_id: &str) -> Result<(), MemoryError> {
    if user_id.trim().is_empty() {
        return Err(MemoryError::Validation(
            "user_id must not be empty".to_string(),
        ));
    }
    Ok(())
}
