//! Storage backend contract for memory records.

use uuid::Uuid;

use crate::error::MemoryError;
use crate::model::MemoryRecord;

/// Persistence contract shared by all backend variants.
///
/// Backends are pure persistence: embedding and ranking happen in the
/// engine. `list` returns records in insertion order, and an absent
/// namespace is an empty result, never an error.
pub trait MemoryStore: Send + Sync {
    /// Persist a new record.
    fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError>;

    /// Fetch one record by id within a namespace.
    fn get(&self, user_id: &str, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError>;

    /// All records for a namespace, earliest first.
    fn list(&self, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Overwrite the record with the same `(user_id, id)`.
    fn replace(&self, record: MemoryRecord) -> Result<(), MemoryError>;

    /// Remove one record.
    fn remove(&self, user_id: &str, id: Uuid) -> Result<(), MemoryError>;

    /// Remove every record for a namespace. Succeeds when already empty.
    fn remove_user(&self, user_id: &str) -> Result<(), MemoryError>;

    /// Remove every record in the store.
    fn clear(&self) -> Result<(), MemoryError>;
}
