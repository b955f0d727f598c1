//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during signing and verification.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The signing secret has no key material.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// The separator would collide with the signature alphabet.
    #[error("invalid signature separator: {0:?}")]
    InvalidSeparator(String),

    /// Signature verification failed.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid hex encoding.
    #[error("invalid hex encoding")]
    InvalidHexEncoding,

    /// I/O error (e.g. reading/writing secret files).
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
