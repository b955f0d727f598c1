//! The entity store abstraction and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::record::{FieldMap, Record, RecordId};
use crate::schema::EntitySchema;

/// Storage for the records of a single entity type.
///
/// Implementations own their consistency model; callers get no locking
/// guarantees across separate calls.
pub trait EntityStore: Send + Sync {
    /// Schema of the stored entity type.
    fn schema(&self) -> &Arc<EntitySchema>;

    /// Look up a record. Absence is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend fails.
    fn by_id(&self, id: RecordId) -> StorageResult<Option<Record>>;

    /// Create and persist a new record from `fields` (missing fields take
    /// their defaults).
    ///
    /// # Errors
    ///
    /// Returns a schema error if any field name is unknown; nothing is
    /// stored in that case.
    fn create(&self, fields: &FieldMap) -> StorageResult<Record>;

    /// Persist the values of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the record no longer exists.
    fn save(&self, record: &Record) -> StorageResult<()>;

    /// Delete a record. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend fails.
    fn delete(&self, id: RecordId) -> StorageResult<bool>;

    /// Copy every field of `id` into a new record with a fresh identifier,
    /// apply `overrides`, and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if `id` is absent, or a schema
    /// error if an override names an unknown field.
    fn duplicate(&self, id: RecordId, overrides: &FieldMap) -> StorageResult<Record>;

    /// Entity type name.
    fn entity_type(&self) -> &str {
        self.schema().name()
    }

    /// Look up a record that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the record is absent.
    fn get(&self, id: RecordId) -> StorageResult<Record> {
        self.by_id(id)?.ok_or_else(|| StorageError::NotFound {
            entity: self.entity_type().to_string(),
            id,
        })
    }

    /// Delete several records, skipping ids that do not exist.
    ///
    /// Returns the number of records actually deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete_many(&self, ids: &[RecordId]) -> StorageResult<usize> {
        let mut deleted = 0usize;
        for id in ids {
            if self.delete(*id)? {
                deleted = deleted.saturating_add(1);
            }
        }
        Ok(deleted)
    }
}

/// Serializable image of a store's contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Entity type the records belong to.
    pub entity: String,
    /// Next identifier to hand out.
    pub next_id: i64,
    /// Stored field values, keyed by identifier.
    pub records: BTreeMap<RecordId, FieldMap>,
}

#[derive(Debug)]
struct Inner {
    next_id: i64,
    records: BTreeMap<RecordId, FieldMap>,
}

impl Inner {
    fn allocate_id(&mut self) -> StorageResult<RecordId> {
        let id = RecordId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| StorageError::Internal("record id space exhausted".into()))?;
        Ok(id)
    }
}

/// Thread-safe in-memory entity store.
///
/// Identifiers start at 1 and are never reused.
#[derive(Debug)]
pub struct MemoryEntityStore {
    schema: Arc<EntitySchema>,
    inner: RwLock<Inner>,
}

impl MemoryEntityStore {
    /// Create an empty store for `schema`.
    #[must_use]
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            inner: RwLock::new(Inner {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    /// Restore a store from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if the snapshot belongs to a
    /// different entity type, holds unknown fields, or has an identifier at
    /// or above `next_id`.
    pub fn from_snapshot(
        schema: Arc<EntitySchema>,
        snapshot: StoreSnapshot,
    ) -> StorageResult<Self> {
        if snapshot.entity != schema.name() {
            return Err(StorageError::Serialization(format!(
                "snapshot holds {} records, expected {}",
                snapshot.entity,
                schema.name()
            )));
        }
        for (id, values) in &snapshot.records {
            if id.0 >= snapshot.next_id {
                return Err(StorageError::Serialization(format!(
                    "record id {id} is not below next_id {}",
                    snapshot.next_id
                )));
            }
            schema
                .check_values(values)
                .map_err(|e| StorageError::Serialization(format!("record {id}: {e}")))?;
        }
        Ok(Self {
            schema,
            inner: RwLock::new(Inner {
                next_id: snapshot.next_id.max(1),
                records: snapshot.records,
            }),
        })
    }

    /// Capture the current contents.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn snapshot(&self) -> StorageResult<StoreSnapshot> {
        let inner = self.read()?;
        Ok(StoreSnapshot {
            entity: self.schema.name().to_string(),
            next_id: inner.next_id,
            records: inner.records.clone(),
        })
    }

    /// Replace the current contents with an earlier snapshot of this store.
    pub(crate) fn restore(&self, snapshot: StoreSnapshot) -> StorageResult<()> {
        let mut inner = self.write()?;
        inner.next_id = snapshot.next_id;
        inner.records = snapshot.records;
        Ok(())
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.read()?.records.len())
    }

    /// Whether the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.read()?.records.is_empty())
    }

    fn read(&self) -> StorageResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    fn write(&self) -> StorageResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    fn record(&self, id: RecordId, values: FieldMap) -> Record {
        Record::new(id, Arc::clone(&self.schema), values)
    }
}

impl EntityStore for MemoryEntityStore {
    fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    fn by_id(&self, id: RecordId) -> StorageResult<Option<Record>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .get(&id)
            .map(|values| self.record(id, values.clone())))
    }

    fn create(&self, fields: &FieldMap) -> StorageResult<Record> {
        self.schema.check_values(fields)?;

        let mut values = self.schema.defaults();
        for (name, value) in fields {
            values.insert(name.clone(), value.clone());
        }

        let mut inner = self.write()?;
        let id = inner.allocate_id()?;
        inner.records.insert(id, values.clone());
        debug!(entity = self.schema.name(), %id, "record created");
        Ok(self.record(id, values))
    }

    fn save(&self, record: &Record) -> StorageResult<()> {
        if record.entity_type() != self.schema.name() {
            return Err(StorageError::Internal(format!(
                "cannot save {} record into {} store",
                record.entity_type(),
                self.schema.name()
            )));
        }
        let mut inner = self.write()?;
        let slot = inner
            .records
            .get_mut(&record.id())
            .ok_or_else(|| StorageError::NotFound {
                entity: self.schema.name().to_string(),
                id: record.id(),
            })?;
        *slot = record.values().clone();
        debug!(entity = self.schema.name(), id = %record.id(), "record saved");
        Ok(())
    }

    fn delete(&self, id: RecordId) -> StorageResult<bool> {
        let removed = self.write()?.records.remove(&id).is_some();
        if removed {
            debug!(entity = self.schema.name(), %id, "record deleted");
        }
        Ok(removed)
    }

    fn duplicate(&self, id: RecordId, overrides: &FieldMap) -> StorageResult<Record> {
        self.schema.check_values(overrides)?;

        let mut inner = self.write()?;
        let mut values = inner
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                entity: self.schema.name().to_string(),
                id,
            })?;
        for (name, value) in overrides {
            values.insert(name.clone(), value.clone());
        }

        let new_id = inner.allocate_id()?;
        inner.records.insert(new_id, values.clone());
        debug!(entity = self.schema.name(), source = %id, id = %new_id, "record duplicated");
        Ok(self.record(new_id, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryEntityStore {
        MemoryEntityStore::new(Arc::new(
            EntitySchema::new("Presentation")
                .with_field("title")
                .with_field("comment"),
        ))
    }

    fn fields(pairs: &[(&str, serde_json::Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_create_and_by_id() {
        let store = store();
        let record = store
            .create(&fields(&[("title", json!("Presentation1"))]))
            .unwrap();
        assert_eq!(record.id(), RecordId(1));
        assert_eq!(record.get("title").unwrap(), json!("Presentation1"));

        let fetched = store.by_id(record.id()).unwrap().unwrap();
        assert_eq!(fetched.values(), record.values());
        assert!(store.by_id(RecordId(99)).unwrap().is_none());
    }

    #[test]
    fn test_create_unknown_field_stores_nothing() {
        let store = store();
        let err = store
            .create(&fields(&[("title", json!("A")), ("author", json!("me"))]))
            .unwrap_err();
        assert!(matches!(err, StorageError::UnknownField { .. }));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_update_and_save() {
        let store = store();
        let mut record = store.create(&fields(&[("title", json!("One"))])).unwrap();
        record.set("title", json!("Two")).unwrap();

        // Not visible until saved.
        assert_eq!(
            store.get(record.id()).unwrap().get("title").unwrap(),
            json!("One")
        );
        store.save(&record).unwrap();
        assert_eq!(
            store.get(record.id()).unwrap().get("title").unwrap(),
            json!("Two")
        );
    }

    #[test]
    fn test_save_deleted_record_fails() {
        let store = store();
        let record = store.create(&FieldMap::new()).unwrap();
        assert!(store.delete(record.id()).unwrap());
        assert!(matches!(
            store.save(&record),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate() {
        let store = store();
        let original = store
            .create(&fields(&[("title", json!("P1")), ("comment", json!("c"))]))
            .unwrap();
        let copy = store
            .duplicate(original.id(), &fields(&[("title", json!("P2"))]))
            .unwrap();

        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.get("title").unwrap(), json!("P2"));
        assert_eq!(copy.get("comment").unwrap(), json!("c"));
        assert_eq!(
            store.get(original.id()).unwrap().get("title").unwrap(),
            json!("P1")
        );
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_missing_and_unknown() {
        let store = store();
        assert!(matches!(
            store.duplicate(RecordId(5), &FieldMap::new()),
            Err(StorageError::NotFound { .. })
        ));

        let original = store.create(&FieldMap::new()).unwrap();
        assert!(matches!(
            store.duplicate(original.id(), &fields(&[("nope", json!(1))])),
            Err(StorageError::UnknownField { .. })
        ));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_ids_not_reused() {
        let store = store();
        let first = store.create(&FieldMap::new()).unwrap();
        store.delete(first.id()).unwrap();
        let second = store.create(&FieldMap::new()).unwrap();
        assert_eq!(second.id(), RecordId(2));
    }

    #[test]
    fn test_delete_many_skips_missing() {
        let store = store();
        let a = store.create(&fields(&[("title", json!("xyz"))])).unwrap();
        let b = store.create(&fields(&[("title", json!("xyz"))])).unwrap();
        let deleted = store
            .delete_many(&[a.id(), RecordId(42), b.id()])
            .unwrap();
        assert_eq!(deleted, 2);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let store = store();
        store.create(&fields(&[("title", json!("A"))])).unwrap();
        store.create(&fields(&[("title", json!("B"))])).unwrap();

        let snapshot = store.snapshot().unwrap();
        let restored = MemoryEntityStore::from_snapshot(Arc::clone(store.schema()), snapshot)
            .unwrap();
        assert_eq!(restored.len().unwrap(), 2);
        let next = restored.create(&FieldMap::new()).unwrap();
        assert_eq!(next.id(), RecordId(3));
    }

    #[test]
    fn test_snapshot_rejects_foreign_entity() {
        let snapshot = StoreSnapshot {
            entity: "Other".into(),
            next_id: 1,
            records: BTreeMap::new(),
        };
        assert!(matches!(
            MemoryEntityStore::from_snapshot(Arc::clone(store().schema()), snapshot),
            Err(StorageError::Serialization(_))
        ));
    }
}
