//! Dispatch error types.

use std::fmt;

use crudcap_capabilities::CapabilityError;
use crudcap_storage::{RecordId, StorageError};
use thiserror::Error;

/// Errors raised while executing a token.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The token failed verification, parsing, or authorization.
    #[error(transparent)]
    Token(#[from] CapabilityError),

    /// The caller's params could not be decoded or have the wrong shape.
    #[error("{0}")]
    Params(String),

    /// The target record is absent at lookup time.
    #[error("{entity} with id={id} does not exist")]
    DoesNotExist {
        /// Entity type that was searched.
        entity: String,
        /// Identifier from the token.
        id: RecordId,
    },

    /// A write named a field the entity does not have, or a read-only one.
    #[error("{0}")]
    Schema(String),

    /// The store failed.
    #[error("{0}")]
    Storage(String),
}

impl From<StorageError> for DispatchError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::DoesNotExist { entity, id },
            e @ (StorageError::UnknownField { .. } | StorageError::ReadOnlyField(_)) => {
                Self::Schema(e.to_string())
            },
            e => Self::Storage(e.to_string()),
        }
    }
}

/// Coarse classification of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The token signature does not verify.
    Signature,
    /// The token payload or command is malformed.
    Format,
    /// Bad arguments while defining a token.
    Definition,
    /// A requested option is not implemented.
    NotImplemented,
    /// The token belongs to another entity type.
    Content,
    /// A field is outside the token's allow-list.
    Permission,
    /// The params are unusable.
    Params,
    /// The record does not exist.
    DoesNotExist,
    /// The entity schema rejected a field.
    Schema,
    /// The store failed.
    Storage,
}

impl ErrorKind {
    /// Short stable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Format => "format",
            Self::Definition => "definition",
            Self::NotImplemented => "not_implemented",
            Self::Content => "content",
            Self::Permission => "permission",
            Self::Params => "params",
            Self::DoesNotExist => "does_not_exist",
            Self::Schema => "schema",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DispatchError {
    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Token(e) => match e {
                CapabilityError::InvalidSignature => ErrorKind::Signature,
                CapabilityError::InvalidFormat(_) => ErrorKind::Format,
                CapabilityError::Definition(_) | CapabilityError::Crypto(_) => {
                    ErrorKind::Definition
                },
                CapabilityError::NotImplemented(_) => ErrorKind::NotImplemented,
                CapabilityError::NamespaceMismatch { .. } => ErrorKind::Content,
                CapabilityError::FieldNotAllowed { .. } => ErrorKind::Permission,
            },
            Self::Params(_) => ErrorKind::Params,
            Self::DoesNotExist { .. } => ErrorKind::DoesNotExist,
            Self::Schema(_) => ErrorKind::Schema,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let err = DispatchError::from(StorageError::NotFound {
            entity: "Presentation".into(),
            id: RecordId(9),
        });
        assert_eq!(err.kind(), ErrorKind::DoesNotExist);
        assert_eq!(err.to_string(), "Presentation with id=9 does not exist");

        let err = DispatchError::from(StorageError::ReadOnlyField("id".into()));
        assert_eq!(err.kind(), ErrorKind::Schema);

        let err = DispatchError::from(StorageError::Io("disk full".into()));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_token_error_kinds() {
        let kind = |e| DispatchError::Token(e).kind();
        assert_eq!(kind(CapabilityError::InvalidSignature), ErrorKind::Signature);
        assert_eq!(
            kind(CapabilityError::FieldNotAllowed {
                field: "x".into()
            }),
            ErrorKind::Permission
        );
        assert_eq!(
            kind(CapabilityError::NamespaceMismatch {
                token_namespace: "A".into(),
                entity: "B".into()
            }),
            ErrorKind::Content
        );
    }
}
