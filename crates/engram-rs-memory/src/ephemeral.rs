//! In-memory backend used for uniform testing and non-persistent runs.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::MemoryError;
use crate::model::MemoryRecord;
use crate::store::MemoryStore;

/// Ephemeral memory store: namespaces held in process memory only.
///
/// Records are kept in insertion order per namespace. Everything is lost
/// when the store is dropped.
#[derive(Debug, Default)]
pub struct EphemeralMemoryStore {
    users: RwLock<HashMap<String, Vec<MemoryRecord>>>,
}

impl EphemeralMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore for EphemeralMemoryStore {
    fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let mut users = self.users.write();
        users.entry(record.user_id.clone()).or_default().push(record);
        Ok(())
    }

    fn get(&self, user_id: &str, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        let users = self.users.read();
        Ok(users
            .get(user_id)
            .and_then(|records| records.iter().find(|record| record.id == id))
            .cloned())
    }

    fn list(&self, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let users = self.users.read();
        Ok(users.get(user_id).cloned().unwrap_or_default())
    }

    fn replace(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let mut users = self.users.write();
        let slot = users
            .get_mut(&record.user_id)
            .and_then(|records| records.iter_mut().find(|slot| slot.id == record.id));
        match slot {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(MemoryError::NotFound {
                id: record.id,
                user_id: record.user_id,
            }),
        }
    }

    fn remove(&self, user_id: &str, id: Uuid) -> Result<(), MemoryError> {
        let mut users = self.users.write();
        let Some(records) = users.get_mut(user_id) else {
            return Err(MemoryError::NotFound {
                id,
                user_id: user_id.to_string(),
            });
        };
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(MemoryError::NotFound {
                id,
                user_id: user_id.to_string(),
            });
        }
        if records.is_empty() {
            users.remove(user_id);
        }
        Ok(())
    }

    fn remove_user(&self, user_id: &str) -> Result<(), MemoryError> {
        self.users.write().remove(user_id);
        Ok(())
    }

    fn clear(&self) -> Result<(), MemoryError> {
        self.users.write().clear();
        Ok(())
    }
}
