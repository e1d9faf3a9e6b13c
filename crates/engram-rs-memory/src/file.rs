//! File-backed storage: one JSON document per store instance.

use log::{debug, info};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::MemoryError;
use crate::model::MemoryRecord;
use crate::store::MemoryStore;

/// Persisted layout: user_id -> memory id -> record.
type StoreData = BTreeMap<String, BTreeMap<Uuid, MemoryRecord>>;

/// File-backed memory store.
///
/// Every mutating operation holds the write lock for the full
/// read-mutate-write cycle and replaces the file through a temp-file
/// rename, so an interrupted writer never leaves a partial document behind.
#[derive(Debug)]
pub struct FileMemoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileMemoryStore {
    /// Open a store at the given path, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        info!("initialized file memory store (path={})", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path to the temporary document used during rewrites.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Read the full document; an absent file is an empty store.
    fn load(&self) -> Result<StoreData, MemoryError> {
        if !self.path.exists() {
            return Ok(StoreData::new());
        }
        let file = OpenOptions::new().read(true).open(&self.path)?;
        let data = serde_json::from_reader(BufReader::new(file))?;
        Ok(data)
    }

    /// Rewrite the document atomically.
    fn save(&self, data: &StoreData) -> Result<(), MemoryError> {
        let temp_path = self.temp_path();
        {
            let file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, data)?;
            writer.flush()?;
        }
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        fs::rename(temp_path, &self.path)?;
        Ok(())
    }

    /// Sort a namespace's records back into insertion order.
    fn ordered(records: &BTreeMap<Uuid, MemoryRecord>) -> Vec<MemoryRecord> {
        let mut records: Vec<MemoryRecord> = records.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }
}

impl MemoryStore for FileMemoryStore {
    /// Persist a record under its namespace.
    fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock();
        let mut data = self.load()?;
        debug!(
            "stored memory (user_id={}, id={}, text_len={})",
            record.user_id,
            record.id,
            record.text.len()
        );
        data.entry(record.user_id.clone())
            .or_default()
            .insert(record.id, record);
        self.save(&data)
    }

    fn get(&self, user_id: &str, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        let data = self.load()?;
        Ok(data.get(user_id).and_then(|records| records.get(&id)).cloned())
    }

    fn list(&self, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let data = self.load()?;
        Ok(data.get(user_id).map(Self::ordered).unwrap_or_default())
    }

    fn replace(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock();
        let mut data = self.load()?;
        let Some(slot) = data
            .get_mut(&record.user_id)
            .and_then(|records| records.get_mut(&record.id))
        else {
            return Err(MemoryError::NotFound {
                id: record.id,
                user_id: record.user_id,
            });
        };
        *slot = record;
        self.save(&data)
    }

    fn remove(&self, user_id: &str, id: Uuid) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock();
        let mut data = self.load()?;
        let removed = data.get_mut(user_id).and_then(|records| records.remove(&id));
        if removed.is_none() {
            return Err(MemoryError::NotFound {
                id,
                user_id: user_id.to_string(),
            });
        }
        if data.get(user_id).is_some_and(BTreeMap::is_empty) {
            data.remove(user_id);
        }
        debug!("removed memory (user_id={}, id={})", user_id, id);
        self.save(&data)
    }

    fn remove_user(&self, user_id: &str) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock();
        let mut data = self.load()?;
        if data.remove(user_id).is_some() {
            info!("removed namespace (user_id={})", user_id);
            self.save(&data)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock();
        self.save(&StoreData::new())
    }
}

#[cfg(test)]
mod tests {
    use super::FileMemoryStore;
    use crate::model::MemoryRecord;
    use crate::store::MemoryStore;
    use crate::MemoryError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn record(text: &str, user_id: &str) -> MemoryRecord {
        MemoryRecord::new(text, user_id, None, vec![0.5, 0.5]).expect("record")
    }

    #[test]
    fn insert_then_list_preserves_insertion_order() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path().join("memories.json")).expect("store");

        store.insert(record("one", "user-1")).expect("insert one");
        store.insert(record("two", "user-1")).expect("insert two");
        store.insert(record("three", "user-1")).expect("insert three");

        let texts: Vec<String> = store
            .list("user-1")
            .expect("list")
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn list_of_absent_namespace_is_empty() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path().join("memories.json")).expect("store");
        assert!(store.list("nobody").expect("list").is_empty());
    }

    #[test]
    fn replace_overwrites_and_errors_on_missing_record() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path().join("memories.json")).expect("store");

        let mut stored = record("before", "user-1");
        store.insert(stored.clone()).expect("insert");
        stored.text = "after".to_string();
        store.replace(stored.clone()).expect("replace");

        let found = store.get("user-1", stored.id).expect("get").expect("record");
        assert_eq!(found.text, "after");

        let missing = record("ghost", "user-1");
        let err = store.replace(missing).unwrap_err();
        assert!(matches!(err, MemoryError::NotFound { .. }));
    }

    #[test]
    fn remove_errors_on_missing_record() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path().join("memories.json")).expect("store");

        let stored = record("one", "user-1");
        store.insert(stored.clone()).expect("insert");
        store.remove("user-1", stored.id).expect("remove");

        let err = store.remove("user-1", stored.id).unwrap_err();
        assert!(matches!(err, MemoryError::NotFound { .. }));
        let err = store.remove("user-1", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, MemoryError::NotFound { .. }));
    }

    #[test]
    fn remove_user_leaves_other_namespaces_intact() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path().join("memories.json")).expect("store");

        store.insert(record("a", "user-1")).expect("insert");
        store.insert(record("b", "user-2")).expect("insert");
        store.remove_user("user-1").expect("remove user");
        store.remove_user("user-1").expect("idempotent remove");

        assert!(store.list("user-1").expect("list").is_empty());
        assert_eq!(store.list("user-2").expect("list").len(), 1);
    }

    #[test]
    fn clear_empties_every_namespace() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path().join("memories.json")).expect("store");

        store.insert(record("a", "user-1")).expect("insert");
        store.insert(record("b", "user-2")).expect("insert");
        store.clear().expect("clear");

        assert!(store.list("user-1").expect("list").is_empty());
        assert!(store.list("user-2").expect("list").is_empty());
    }

    #[test]
    fn records_survive_reopening_the_store() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memories.json");

        let stored = record("persistent note", "user-1");
        {
            let store = FileMemoryStore::new(&path).expect("store");
            store.insert(stored.clone()).expect("insert");
        }

        let reopened = FileMemoryStore::new(&path).expect("reopen");
        let found = reopened
            .get("user-1", stored.id)
            .expect("get")
            .expect("record");
        assert_eq!(found, stored);
    }
}
