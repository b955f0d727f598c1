//! Record handles and identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageResult;
use crate::schema::{EntitySchema, ID_FIELD};

/// Ordered mapping of field name to value.
///
/// Insertion order is preserved, so results list fields in the order
/// callers asked for them.
pub type FieldMap = serde_json::Map<String, Value>;

/// Opaque record identifier, unique within one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::from(id.0)
    }
}

/// A resolved record: an identifier, its schema, and its field values.
///
/// A `Record` is a detached copy. Changes made through [`set`](Self::set)
/// or [`update_fields`](Self::update_fields) only reach the store when the
/// record is passed to [`EntityStore::save`](crate::EntityStore::save).
#[derive(Debug, Clone)]
pub struct Record {
    id: RecordId,
    schema: Arc<EntitySchema>,
    values: FieldMap,
}

impl Record {
    /// Assemble a record from stored values.
    ///
    /// Fields missing from `values` take their schema default; keys outside
    /// the schema are dropped. Store implementations call this after
    /// validating input.
    #[must_use]
    pub fn new(id: RecordId, schema: Arc<EntitySchema>, mut values: FieldMap) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| {
                let value = values
                    .remove(f.name())
                    .unwrap_or_else(|| f.default_value().clone());
                (f.name().to_string(), value)
            })
            .collect();
        Self { id, schema, values }
    }

    /// Record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Entity type name.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        self.schema.name()
    }

    /// The record's schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// All non-identifier field values, in schema order.
    #[must_use]
    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    /// Read one field by name. `"id"` yields the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownField`](crate::StorageError::UnknownField)
    /// if the schema has no such field.
    pub fn get(&self, name: &str) -> StorageResult<Value> {
        self.schema.check_readable(name)?;
        if name == ID_FIELD {
            return Ok(self.id.into());
        }
        Ok(self.values.get(name).cloned().unwrap_or(Value::Null))
    }

    /// Assign one field by name.
    ///
    /// # Errors
    ///
    /// Returns a schema error for unknown names or the identifier.
    pub fn set(&mut self, name: &str, value: Value) -> StorageResult<()> {
        self.schema.check_writable(name)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Read several fields at once.
    ///
    /// The identifier is always included, after the requested fields unless
    /// it was requested explicitly.
    ///
    /// # Errors
    ///
    /// Returns a schema error if any requested name is unknown.
    pub fn read_fields<I, S>(&self, names: I) -> StorageResult<FieldMap>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = FieldMap::new();
        for name in names {
            let name = name.as_ref();
            out.insert(name.to_string(), self.get(name)?);
        }
        if !out.contains_key(ID_FIELD) {
            out.insert(ID_FIELD.to_string(), self.id.into());
        }
        Ok(out)
    }

    /// Assign several fields at once.
    ///
    /// All names are checked before any value is written, so a failed call
    /// leaves the record unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first schema violation in map order.
    pub fn update_fields(&mut self, values: &FieldMap) -> StorageResult<()> {
        self.schema.check_values(values)?;
        for (name, value) in values {
            self.values.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}
