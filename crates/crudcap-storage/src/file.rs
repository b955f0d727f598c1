//! JSON-file-backed entity store.
//!
//! Each entity type lives in `{dir}/{Entity}.json`. The file is rewritten
//! atomically (temp file + rename) after every successful mutation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::record::{FieldMap, Record, RecordId};
use crate::schema::EntitySchema;
use crate::store::{EntityStore, MemoryEntityStore, StoreSnapshot};

/// Entity store persisted as a JSON document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryEntityStore,
    // Held across mutate-then-write so rollbacks never undo another caller.
    flush_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or create) the store for `schema` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory or file cannot be
    /// accessed, or [`StorageError::Serialization`] if the existing file is
    /// malformed or does not match the schema.
    pub fn open(dir: impl AsRef<Path>, schema: Arc<EntitySchema>) -> StorageResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;
        let path = dir.join(format!("{}.json", schema.name()));

        let memory = if path.exists() {
            let bytes = std::fs::read(&path).map_err(|e| StorageError::Io(e.to_string()))?;
            let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            let store = MemoryEntityStore::from_snapshot(schema, snapshot)?;
            info!(path = %path.display(), records = store.len()?, "opened entity store");
            store
        } else {
            debug!(path = %path.display(), "starting empty entity store");
            MemoryEntityStore::new(schema)
        };

        Ok(Self {
            path,
            memory,
            flush_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] or [`StorageError::Serialization`] on
    /// failure; the previous file is left intact.
    pub fn flush(&self) -> StorageResult<()> {
        let _guard = self.lock()?;
        self.write_file()
    }

    /// Run a mutation and persist it. If the file cannot be written the
    /// in-memory contents are rolled back, so a failed call leaves no trace.
    fn commit<T>(
        &self,
        mutation: impl FnOnce(&MemoryEntityStore) -> StorageResult<(T, bool)>,
    ) -> StorageResult<T> {
        let _guard = self.lock()?;
        let before = self.memory.snapshot()?;
        let (out, changed) = mutation(&self.memory)?;
        if changed {
            if let Err(e) = self.write_file() {
                warn!(path = %self.path.display(), error = %e, "write failed, rolling back");
                self.memory.restore(before)?;
                return Err(e);
            }
        }
        Ok(out)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, ()>> {
        self.flush_lock
            .lock()
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    fn write_file(&self) -> StorageResult<()> {
        let snapshot = self.memory.snapshot()?;
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| StorageError::Io(e.to_string()))?;
        tmp.write_all(&json)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}

impl EntityStore for JsonFileStore {
    fn schema(&self) -> &Arc<EntitySchema> {
        self.memory.schema()
    }

    fn by_id(&self, id: RecordId) -> StorageResult<Option<Record>> {
        self.memory.by_id(id)
    }

    fn create(&self, fields: &FieldMap) -> StorageResult<Record> {
        self.commit(|memory| Ok((memory.create(fields)?, true)))
    }

    fn save(&self, record: &Record) -> StorageResult<()> {
        self.commit(|memory| {
            memory.save(record)?;
            Ok(((), true))
        })
    }

    fn delete(&self, id: RecordId) -> StorageResult<bool> {
        self.commit(|memory| {
            let removed = memory.delete(id)?;
            Ok((removed, removed))
        })
    }

    fn duplicate(&self, id: RecordId, overrides: &FieldMap) -> StorageResult<Record> {
        self.commit(|memory| Ok((memory.duplicate(id, overrides)?, true)))
    }
}
