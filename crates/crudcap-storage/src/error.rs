//! Storage error types.

use crate::record::RecordId;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("{entity} with id={id} does not exist")]
    NotFound {
        /// Entity type that was searched.
        entity: String,
        /// Identifier that was not found.
        id: RecordId,
    },

    /// A field name is not part of the entity schema.
    #[error("unknown attribute `{field}` on {entity}")]
    UnknownField {
        /// Entity type whose schema was consulted.
        entity: String,
        /// The offending field name.
        field: String,
    },

    /// A field exists but cannot be written (the identifier).
    #[error("attribute `{0}` is read-only")]
    ReadOnlyField(String),

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Internal(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
