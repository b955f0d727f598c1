//! Crudcap Test - Shared test utilities.
//!
//! Fixtures build a codec, schema, store and dispatcher that agree with
//! each other; mocks record what the dispatcher asked the store to do.
//!
//! ```toml
//! [dev-dependencies]
//! crudcap-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use crudcap_test::{RecordingStore, StoreCall, dispatcher_over};
//!
//! #[test]
//! fn test_denied_update_never_saves() {
//!     let store = RecordingStore::presentation();
//!     let dispatcher = dispatcher_over(store.clone());
//!     // ...
//!     assert!(!store.calls().iter().any(|c| matches!(c, StoreCall::Save(_))));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
