//! Crudcap Dispatch - Execute CRUD capability tokens against entity stores.
//!
//! This crate provides:
//! - [`CommandDispatcher`], which verifies a token, enforces its namespace
//!   and field allow-list, and runs the command on an [`EntityStore`]
//! - [`Params`] normalization (bytes, JSON text, or parsed values)
//! - [`CrudApi`], a JSON request handler with `success`/`errmsg` responses
//!
//! [`EntityStore`]: crudcap_storage::EntityStore
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use crudcap_capabilities::TokenCodec;
//! use crudcap_crypto::SigningSecret;
//! use crudcap_dispatch::CommandDispatcher;
//! use crudcap_storage::{EntitySchema, MemoryEntityStore};
//! use serde_json::json;
//!
//! let codec = TokenCodec::shared(&SigningSecret::from_text("change-me").unwrap()).unwrap();
//! let schema = Arc::new(EntitySchema::new("Presentation").with_field("title"));
//! let dispatcher = CommandDispatcher::new(codec, Arc::new(MemoryEntityStore::new(schema)));
//!
//! let token = dispatcher.issuer().create_token(&["title"]).unwrap();
//! let created = dispatcher.execute(&token, json!({"title": "Hello"})).unwrap();
//! assert!(created.contains_key("id"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod api;
mod dispatcher;
mod error;
mod params;

pub use api::{ApiResponse, CrudApi, STATUS_FAILED, STATUS_OK};
pub use dispatcher::CommandDispatcher;
pub use error::{DispatchError, DispatchResult, ErrorKind};
pub use params::Params;
