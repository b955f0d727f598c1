//! Layered configuration for crudcap.
//!
//! # Usage
//!
//! ```rust,no_run
//! use crudcap_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! for entity in &resolved.config.entities {
//!     println!("{}: {:?}", entity.name, entity.fields);
//! }
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit file** (`--config path.toml`)
//! 2. **User** (`~/.crudcap/config.toml`)
//! 3. **Environment variables** (`CRUDCAP_SECRET_KEY`, `CRUDCAP_LOG_LEVEL`,
//!    `CRUDCAP_STORE_PATH`), which only fill fields no file set
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! String values may reference environment variables as `${VAR}`.
//!
//! This crate depends on no other crudcap crate. Conversion into domain
//! types happens in the CLI's config bridge.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use merge::ConfigLayer;
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, None)
    }

    /// Load configuration with an explicit home directory.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with_home(
        explicit: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, Some(home_dir))
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
