//! Configuration types.
//!
//! Every section implements [`Default`] so a bare `[section]` header, or no
//! header at all, yields a working value.

use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token signing key material.
    pub signing: SigningSection,
    /// Log level and format.
    pub logging: LoggingSection,
    /// Where records are persisted.
    pub store: StoreSection,
    /// Entity types served, with their field names.
    pub entities: Vec<EntitySection>,
}

impl Config {
    /// Find an entity definition by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntitySection> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Token signing configuration.
///
/// At most one of `secret_key` and `secret_key_file` may be set. With
/// neither, a random key is generated on first use and kept under the user's
/// crudcap directory.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SigningSection {
    /// The secret itself, usually as a `${VAR}` reference.
    pub secret_key: Option<String>,
    /// File holding a hex-encoded secret, created if missing.
    pub secret_key_file: Option<PathBuf>,
}

impl std::fmt::Debug for SigningSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSection")
            .field("has_secret_key", &self.secret_key.is_some())
            .field("secret_key_file", &self.secret_key_file)
            .finish()
    }
}

impl Serialize for SigningSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SigningSection", 1)?;
        // secret_key is never written out.
        state.serialize_field("secret_key_file", &self.secret_key_file)?;
        state.end()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `pretty`, `compact`, `json`, or `full`.
    pub format: String,
    /// Extra `tracing` directives, e.g. `"crudcap_dispatch=debug"`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

/// Record storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Directory holding one JSON file per entity type.
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("crudcap-data"),
        }
    }
}

/// One entity type and its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySection {
    /// Entity type name, also the token namespace.
    pub name: String,
    /// Field names, excluding the implicit `id`.
    #[serde(default)]
    pub fields: Vec<String>,
}
