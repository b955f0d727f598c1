//! Capability token error types.

use thiserror::Error;

/// Errors raised while creating, decoding, or checking capability tokens.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The token's signature does not verify. No token content is exposed.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The verified payload does not follow the token grammar.
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// Bad arguments when defining a token.
    #[error("invalid token definition: {0}")]
    Definition(String),

    /// A documented option that has never been implemented.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The token was issued for a different entity type.
    #[error("using {token_namespace} token for a {entity} object")]
    NamespaceMismatch {
        /// Namespace carried by the token.
        token_namespace: String,
        /// Entity type the token was presented to.
        entity: String,
    },

    /// A requested field is not in the token's allow-list.
    #[error("field `{field}` not allowed by token")]
    FieldNotAllowed {
        /// The first disallowed field encountered.
        field: String,
    },

    /// The signing backend could not be set up.
    #[error("crypto error: {0}")]
    Crypto(#[from] crudcap_crypto::CryptoError),
}

/// Result type for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;
