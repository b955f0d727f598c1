//! Prelude module - commonly used types for convenient import.
//!
//! Use `use crudcap_capabilities::prelude::*;` to import all essential types.

pub use crate::{
    CapabilityError, CapabilityResult, CapabilityToken, CombinedOptions, CombinedTokens,
    CommandSpec, CrudCommand, NO_FIELDS, PermissionSet, RecordId, TokenCodec, TokenIssuer,
};
