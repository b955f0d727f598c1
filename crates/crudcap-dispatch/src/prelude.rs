//! Prelude module - commonly used types for convenient import.
//!
//! Use `use crudcap_dispatch::prelude::*;` to import all essential types.

pub use crate::{
    ApiResponse, CommandDispatcher, CrudApi, DispatchError, DispatchResult, ErrorKind, Params,
};
