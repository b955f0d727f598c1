//! Crudcap Capabilities - Signed, field-scoped CRUD tokens.
//!
//! This crate provides:
//! - [`TokenCodec`], which signs and verifies the `::`-delimited token format
//! - [`CapabilityToken`], the verified view of a token
//! - [`PermissionSet`] for exact field allow-lists
//! - [`TokenIssuer`] for per-entity create/read/update/duplicate/delete tokens
//!
//! # Security Model
//!
//! A token is a bearer capability. Whoever holds it may perform the encoded
//! command on the encoded fields until the process secret changes. Tokens
//! carry no expiry and cannot be revoked individually.
//!
//! # Example
//!
//! ```
//! use crudcap_capabilities::{RecordId, TokenCodec};
//! use crudcap_crypto::SigningSecret;
//!
//! let codec = TokenCodec::new(&SigningSecret::from_text("change-me").unwrap()).unwrap();
//!
//! let token = codec
//!     .issuer("Presentation")
//!     .read_token(RecordId(1), &["title"])
//!     .unwrap();
//! assert!(token.starts_with("Presentation::read:1::ALLOW::title:::"));
//!
//! let decoded = codec.decode(&token).unwrap();
//! assert!(decoded.allowed("title"));
//! assert!(!decoded.allowed("comment"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod command;
mod error;
mod issuer;
mod permission;
mod token;

pub use command::{CommandSpec, CrudCommand};
pub use crudcap_storage::RecordId;
pub use error::{CapabilityError, CapabilityResult};
pub use issuer::{CombinedOptions, CombinedTokens, TokenIssuer};
pub use permission::PermissionSet;
pub use token::{
    ALLOW_MARKER, CapabilityToken, MIN_NAMESPACE_LEN, NO_FIELDS, PARAM_SEPARATOR, SEPARATOR,
    SIGNATURE_SEPARATOR, TOKEN_SALT, TokenCodec,
};
