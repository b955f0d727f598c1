//! Mock implementations for testing.

use std::sync::{Arc, Mutex, PoisonError};

use crudcap_storage::{
    EntitySchema, EntityStore, FieldMap, MemoryEntityStore, Record, RecordId, StorageResult,
};

use crate::fixtures::presentation_schema;

/// A store operation, as seen by [`RecordingStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    /// `by_id`
    ById(RecordId),
    /// `create`
    Create,
    /// `save`
    Save(RecordId),
    /// `delete`
    Delete(RecordId),
    /// `duplicate`
    Duplicate(RecordId),
}

/// In-memory store that logs every call it receives.
///
/// Clones share the same records and the same log.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    inner: Arc<MemoryEntityStore>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl RecordingStore {
    /// Wrap an empty store for `schema`.
    #[must_use]
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            inner: Arc::new(MemoryEntityStore::new(schema)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Recording store for the fixture `Presentation` schema.
    #[must_use]
    pub fn presentation() -> Arc<Self> {
        Arc::new(Self::new(presentation_schema()))
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of mutating calls (create, save, delete, duplicate).
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !matches!(call, StoreCall::ById(_)))
            .count()
    }

    /// Forget the calls recorded so far.
    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The wrapped store, for seeding without recording.
    #[must_use]
    pub fn inner(&self) -> &MemoryEntityStore {
        &self.inner
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl EntityStore for RecordingStore {
    fn schema(&self) -> &Arc<EntitySchema> {
        self.inner.schema()
    }

    fn by_id(&self, id: RecordId) -> StorageResult<Option<Record>> {
        self.record(StoreCall::ById(id));
        self.inner.by_id(id)
    }

    fn create(&self, fields: &FieldMap) -> StorageResult<Record> {
        self.record(StoreCall::Create);
        self.inner.create(fields)
    }

    fn save(&self, record: &Record) -> StorageResult<()> {
        self.record(StoreCall::Save(record.id()));
        self.inner.save(record)
    }

    fn delete(&self, id: RecordId) -> StorageResult<bool> {
        self.record(StoreCall::Delete(id));
        self.inner.delete(id)
    }

    fn duplicate(&self, id: RecordId, overrides: &FieldMap) -> StorageResult<Record> {
        self.record(StoreCall::Duplicate(id));
        self.inner.duplicate(id, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let store = RecordingStore::presentation();
        let record = store.create(&FieldMap::new()).unwrap();
        store.by_id(record.id()).unwrap();
        assert!(store.delete(record.id()).unwrap());

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Create,
                StoreCall::ById(record.id()),
                StoreCall::Delete(record.id()),
            ]
        );
        assert_eq!(store.mutation_count(), 2);

        store.clear_calls();
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_clones_share_log() {
        let store = RecordingStore::presentation();
        let other = store.as_ref().clone();
        other.create(&FieldMap::new()).unwrap();
        assert_eq!(store.calls(), vec![StoreCall::Create]);
        assert_eq!(store.inner().len().unwrap(), 1);
    }
}
