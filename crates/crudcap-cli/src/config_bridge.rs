//! Bridge from `crudcap_config::Config` to domain types.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use crudcap_config::{Config, ResolvedConfig, loader::USER_DIR_NAME};
use crudcap_crypto::SigningSecret;
use crudcap_storage::{EntitySchema, JsonFileStore};
use crudcap_telemetry::LogConfig;

/// File name of the generated secret under the user's crudcap directory.
pub(crate) const SECRET_FILE_NAME: &str = "secret.key";

/// Logging settings from the `[logging]` section.
#[must_use]
pub(crate) fn to_log_config(config: &Config) -> LogConfig {
    LogConfig::from(&config.logging)
}

/// Where the signing secret comes from when no inline key is configured.
#[must_use]
pub(crate) fn secret_file_path(resolved: &ResolvedConfig) -> PathBuf {
    resolved
        .config
        .signing
        .secret_key_file
        .clone()
        .unwrap_or_else(|| resolved.home_dir.join(USER_DIR_NAME).join(SECRET_FILE_NAME))
}

/// Resolve the signing secret.
///
/// An inline `secret_key` wins. Otherwise the key file is loaded, and
/// generated on first use.
pub(crate) fn signing_secret(resolved: &ResolvedConfig) -> Result<SigningSecret> {
    if let Some(text) = &resolved.config.signing.secret_key {
        return SigningSecret::from_text(text).context("invalid signing.secret_key");
    }
    let path = secret_file_path(resolved);
    SigningSecret::load_or_generate(&path)
        .with_context(|| format!("failed to load signing secret from {}", path.display()))
}

/// Schema of a configured entity type.
pub(crate) fn entity_schema(config: &Config, name: &str) -> Result<Arc<EntitySchema>> {
    let section = config.entity(name).ok_or_else(|| {
        anyhow!("entity '{name}' is not configured; add an [[entities]] section")
    })?;
    let schema = section
        .fields
        .iter()
        .fold(EntitySchema::new(&section.name), |schema, field| {
            schema.with_field(field)
        });
    Ok(Arc::new(schema))
}

/// Open the JSON file store for a configured entity type.
pub(crate) fn open_store(config: &Config, name: &str) -> Result<JsonFileStore> {
    let schema = entity_schema(config, name)?;
    JsonFileStore::open(&config.store.path, schema).with_context(|| {
        format!(
            "failed to open store for '{name}' in {}",
            config.store.path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudcap_config::EntitySection;

    fn config_with_entity() -> Config {
        let mut config = Config::default();
        config.entities.push(EntitySection {
            name: "Presentation".to_owned(),
            fields: vec!["title".to_owned(), "comment".to_owned()],
        });
        config
    }

    #[test]
    fn test_entity_schema_from_section() {
        let schema = entity_schema(&config_with_entity(), "Presentation").unwrap();
        assert_eq!(schema.name(), "Presentation");
        assert!(schema.has_field("title"));
        assert!(schema.has_field("comment"));
    }

    #[test]
    fn test_unknown_entity_is_error() {
        let err = entity_schema(&config_with_entity(), "Invoice").unwrap_err();
        assert!(err.to_string().contains("Invoice"));
    }

    #[test]
    fn test_open_store_under_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_entity();
        config.store.path = dir.path().to_path_buf();
        let store = open_store(&config, "Presentation").unwrap();
        assert_eq!(store.path(), dir.path().join("Presentation.json"));
    }

    #[test]
    fn test_inline_secret_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolved = Config::load_with_home(None, dir.path()).unwrap();
        resolved.config.signing.secret_key = Some("inline".to_owned());
        let secret = signing_secret(&resolved).unwrap();
        assert_eq!(secret.expose(), b"inline");
        assert!(!dir.path().join(USER_DIR_NAME).join(SECRET_FILE_NAME).exists());
    }

    #[test]
    fn test_generated_secret_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolved = Config::load_with_home(None, dir.path()).unwrap();
        resolved.config.signing.secret_key = None;
        let first = signing_secret(&resolved).unwrap();
        let second = signing_secret(&resolved).unwrap();
        assert_eq!(first.expose(), second.expose());
        assert!(secret_file_path(&resolved).exists());
    }
}
