//! CLI command handlers.

pub(crate) mod config;
pub(crate) mod execute;
pub(crate) mod inspect;
pub(crate) mod issue;
pub(crate) mod keys;
