//! Crudcap Telemetry - Logging setup for crudcap binaries.
//!
//! Library crates only emit `tracing` events; this crate installs the
//! subscriber that formats them.
//!
//! # Example
//!
//! ```rust,no_run
//! use crudcap_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), crudcap_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("crudcap_storage=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
