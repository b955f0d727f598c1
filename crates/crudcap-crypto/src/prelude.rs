//! Prelude module - commonly used types for convenient import.
//!
//! Use `use crudcap_crypto::prelude::*;` to import all essential types.

// Errors
pub use crate::{CryptoError, CryptoResult};

// Key material and signing
pub use crate::{Signer, SigningSecret};
