//! Crudcap Storage - Entity records behind a small, synchronous store trait.
//!
//! The dispatcher never talks to a database directly. It works against
//! [`EntityStore`], one store per entity type, each with a fixed
//! [`EntitySchema`]. Two implementations ship with the crate:
//!
//! - [`MemoryEntityStore`] - thread-safe, in-process
//! - [`JsonFileStore`] - the in-memory store persisted to `{Entity}.json`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use crudcap_storage::{EntitySchema, EntityStore, FieldMap, MemoryEntityStore};
//!
//! let schema = Arc::new(EntitySchema::new("Presentation").with_field("title"));
//! let store = MemoryEntityStore::new(schema);
//!
//! let mut fields = FieldMap::new();
//! fields.insert("title".into(), "Quarterly review".into());
//! let record = store.create(&fields).unwrap();
//!
//! let read = record.read_fields(["title"]).unwrap();
//! assert_eq!(read["title"], "Quarterly review");
//! assert_eq!(read["id"], 1);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod file;
pub mod record;
pub mod schema;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use file::JsonFileStore;
pub use record::{FieldMap, Record, RecordId};
pub use schema::{EntitySchema, FieldDef, ID_FIELD};
pub use store::{EntityStore, MemoryEntityStore, StoreSnapshot};
