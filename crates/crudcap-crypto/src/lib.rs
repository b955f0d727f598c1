//! Crudcap Crypto - Signing primitives for capability tokens.
//!
//! This crate provides:
//! - [`SigningSecret`], the process-wide key material (zeroized on drop)
//! - [`Signer`], a salted keyed MAC that appends a detached signature to text
//!
//! # Example
//!
//! ```
//! use crudcap_crypto::{Signer, SigningSecret};
//!
//! let secret = SigningSecret::from_text("change-me").unwrap();
//! let signer = Signer::new(&secret, "token").with_separator(":::").unwrap();
//!
//! let signed = signer.sign("payload");
//! assert_eq!(signer.unsign(&signed).unwrap(), "payload");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod secret;
mod signer;

pub use error::{CryptoError, CryptoResult};
pub use secret::{GENERATED_SECRET_LEN, SigningSecret};
pub use signer::{DEFAULT_SEPARATOR, Signer};
