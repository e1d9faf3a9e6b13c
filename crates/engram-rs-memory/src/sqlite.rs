//! SQLite-backed storage using rusqlite.

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use std::path::Path;
use uuid::Uuid;

use crate::error::MemoryError;
use crate::model::MemoryRecord;
use crate::store::MemoryStore;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    text TEXT NOT NULL,
    metadata TEXT NOT NULL,
    vector BLOB NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_memories_user_id ON memories(user_id);
";

const COLUMNS: &str = "id, user_id, text, metadata, vector, created_at";

/// SQLite-backed memory store.
///
/// One row per record; vectors are stored as little-endian f32 bytes and
/// `rowid` recovers insertion order. Every mutating operation runs inside
/// its own transaction.
pub struct SqliteMemoryStore {
    conn: Mutex<Connection>,
}

impl SqliteMemoryStore {
    /// Open (or create) the database file and ensure the schema.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let conn = Connection::open(path.as_ref())?;
        info!(
            "initialized sqlite memory store (path={})",
            path.as_ref().display()
        );
        Self::with_connection(conn)
    }

    /// Open a private in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, MemoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, MemoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Decode one `memories` row.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let text: String = row.get(2)?;
    let metadata: String = row.get(3)?;
    let vector: Vec<u8> = row.get(4)?;
    let created_at: String = row.get(5)?;

    let id = Uuid::parse_str(&id)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?;
    let metadata: Map<String, Value> = serde_json::from_str(&metadata)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(err)))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(err)))?
        .with_timezone(&Utc);

    Ok(MemoryRecord {
        id,
        user_id,
        text,
        metadata,
        vector: vector_from_blob(&vector),
        created_at,
    })
}

/// Encode a vector as little-endian f32 bytes.
fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Decode little-endian f32 bytes back into a vector.
fn vector_from_blob(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

impl MemoryStore for SqliteMemoryStore {
    fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let metadata = serde_json::to_string(&record.metadata)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO memories (id, user_id, text, metadata, vector, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id.to_string(),
                record.user_id,
                record.text,
                metadata,
                vector_to_blob(&record.vector),
                record.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        debug!(
            "stored memory (user_id={}, id={}, text_len={})",
            record.user_id,
            record.id,
            record.text.len()
        );
        Ok(())
    }

    fn get(&self, user_id: &str, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM memories WHERE user_id = ?1 AND id = ?2"),
                params![user_id, id.to_string()],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn list(&self, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM memories WHERE user_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn replace(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let metadata = serde_json::to_string(&record.metadata)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE memories SET text = ?1, metadata = ?2, vector = ?3 \
             WHERE user_id = ?4 AND id = ?5",
            params![
                record.text,
                metadata,
                vector_to_blob(&record.vector),
                record.user_id,
                record.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(MemoryError::NotFound {
                id: record.id,
                user_id: record.user_id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, user_id: &str, id: Uuid) -> Result<(), MemoryError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "DELETE FROM memories WHERE user_id = ?1 AND id = ?2",
            params![user_id, id.to_string()],
        )?;
        if changed == 0 {
            return Err(MemoryError::NotFound {
                id,
                user_id: user_id.to_string(),
            });
        }
        tx.commit()?;
        debug!("removed memory (user_id={}, id={})", user_id, id);
        Ok(())
    }

    fn remove_user(&self, user_id: &str) -> Result<(), MemoryError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM memories WHERE user_id = ?1", params![user_id])?;
        tx.commit()?;
        if removed > 0 {
            info!("removed namespace (user_id={}, records={})", user_id, removed);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), MemoryError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM memories", [])?;
        tx.commit()?;
        Ok(())
    }
}
