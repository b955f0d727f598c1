//! Static entity schemas.
//!
//! Every entity type has a fixed set of named fields. Stores and records
//! check names against the schema at the boundary, so an unknown attribute
//! is reported as [`StorageError::UnknownField`] instead of being silently
//! stored.

use serde_json::Value;

use crate::error::{StorageError, StorageResult};
use crate::record::FieldMap;

/// Name of the identifier field every record exposes.
pub const ID_FIELD: &str = "id";

/// A single field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: String,
    default: Value,
}

impl FieldDef {
    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value a freshly created record starts with.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

/// The fixed schema of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    name: String,
    fields: Vec<FieldDef>,
}

impl EntitySchema {
    /// Create an empty schema for the entity type `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field that defaults to `null`.
    #[must_use]
    pub fn with_field(self, name: impl Into<String>) -> Self {
        self.with_field_default(name, Value::Null)
    }

    /// Add a field with an explicit default value.
    ///
    /// Adding the same name twice replaces the earlier default.
    #[must_use]
    pub fn with_field_default(mut self, name: impl Into<String>, default: Value) -> Self {
        let name = name.into();
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == name) {
            existing.default = default;
        } else {
            self.fields.push(FieldDef { name, default });
        }
        self
    }

    /// Entity type name (used as the token namespace).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field definitions in declaration order (identifier excluded).
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field names in declaration order (identifier excluded).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDef::name)
    }

    /// Whether `name` is readable on records of this type.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        name == ID_FIELD || self.fields.iter().any(|f| f.name == name)
    }

    /// Check that `name` exists and is readable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownField`] for names outside the schema.
    pub fn check_readable(&self, name: &str) -> StorageResult<()> {
        if self.has_field(name) {
            Ok(())
        } else {
            Err(self.unknown(name))
        }
    }

    /// Check that `name` exists and may be assigned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnlyField`] for the identifier and
    /// [`StorageError::UnknownField`] for names outside the schema.
    pub fn check_writable(&self, name: &str) -> StorageResult<()> {
        if name == ID_FIELD {
            return Err(StorageError::ReadOnlyField(name.to_string()));
        }
        if self.fields.iter().any(|f| f.name == name) {
            Ok(())
        } else {
            Err(self.unknown(name))
        }
    }

    /// Check every key of `values` with [`check_writable`](Self::check_writable).
    ///
    /// Keys are checked in map order; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first schema violation found.
    pub fn check_values(&self, values: &FieldMap) -> StorageResult<()> {
        values.keys().try_for_each(|name| self.check_writable(name))
    }

    /// The default value of every field, in declaration order.
    #[must_use]
    pub fn defaults(&self) -> FieldMap {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect()
    }

    fn unknown(&self, name: &str) -> StorageError {
        StorageError::UnknownField {
            entity: self.name.clone(),
            field: name.to_string(),
        }
    }
}
