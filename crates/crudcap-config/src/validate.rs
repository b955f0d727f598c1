//! Post-merge configuration validation.

use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Minimum entity name length; entity names double as token namespaces.
const MIN_ENTITY_NAME_LEN: usize = 2;

/// Field name reserved for record identifiers.
const RESERVED_FIELD: &str = "id";

/// Validate a merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_signing(config)?;
    validate_logging(config)?;
    validate_store(config)?;
    validate_entities(config)?;
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_signing(config: &Config) -> ConfigResult<()> {
    let s = &config.signing;
    if s.secret_key.as_deref().is_some_and(str::is_empty) {
        return Err(invalid("signing.secret_key", "secret key must not be empty"));
    }
    if s.secret_key.is_some() && s.secret_key_file.is_some() {
        return Err(invalid(
            "signing.secret_key_file",
            "set either secret_key or secret_key_file, not both",
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}

fn validate_store(config: &Config) -> ConfigResult<()> {
    if config.store.path.as_os_str().is_empty() {
        return Err(invalid("store.path", "store path must not be empty"));
    }
    Ok(())
}

fn validate_entities(config: &Config) -> ConfigResult<()> {
    let mut names = HashSet::new();
    for (i, entity) in config.entities.iter().enumerate() {
        let field = format!("entities[{i}].name");
        if entity.name.chars().count() < MIN_ENTITY_NAME_LEN {
            return Err(invalid(
                field,
                format!("entity name must be at least {MIN_ENTITY_NAME_LEN} characters"),
            ));
        }
        if entity.name.contains(':') {
            return Err(invalid(field, "entity name must not contain ':'"));
        }
        if !names.insert(entity.name.as_str()) {
            return Err(invalid(
                field,
                format!("entity '{}' is defined twice", entity.name),
            ));
        }

        let mut seen = HashSet::new();
        for name in &entity.fields {
            let field = format!("entities[{i}].fields");
            if name.is_empty() {
                return Err(invalid(field, "field names must not be empty"));
            }
            if name.contains(':') {
                return Err(invalid(field, format!("field '{name}' must not contain ':'")));
            }
            if name == RESERVED_FIELD {
                return Err(invalid(field, "'id' is implicit and cannot be declared"));
            }
            if !seen.insert(name.as_str()) {
                return Err(invalid(field, format!("field '{name}' is listed twice")));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::types::EntitySection;

    fn entity(name: &str, fields: &[&str]) -> EntitySection {
        EntitySection {
            name: name.to_owned(),
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    fn assert_invalid(config: &Config, expected_field: &str) {
        match validate(config) {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected validation error on {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_signing_rules() {
        let mut config = Config::default();
        config.signing.secret_key = Some(String::new());
        assert_invalid(&config, "signing.secret_key");

        config.signing.secret_key = Some("k".to_owned());
        config.signing.secret_key_file = Some(PathBuf::from("/tmp/key"));
        assert_invalid(&config, "signing.secret_key_file");
    }

    #[test]
    fn test_logging_rules() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert_invalid(&config, "logging.level");

        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_invalid(&config, "logging.format");
    }

    #[test]
    fn test_empty_store_path() {
        let mut config = Config::default();
        config.store.path = PathBuf::new();
        assert_invalid(&config, "store.path");
    }

    #[test]
    fn test_entity_names() {
        let mut config = Config::default();
        config.entities = vec![entity("P", &[])];
        assert_invalid(&config, "entities[0].name");

        config.entities = vec![entity("Pre:sentation", &[])];
        assert_invalid(&config, "entities[0].name");

        config.entities = vec![entity("Presentation", &[]), entity("Presentation", &[])];
        assert_invalid(&config, "entities[1].name");
    }

    #[test]
    fn test_entity_fields() {
        let mut config = Config::default();
        for bad in [&["id"][..], &[""][..], &["a:b"][..], &["title", "title"][..]] {
            config.entities = vec![entity("Presentation", bad)];
            assert_invalid(&config, "entities[0].fields");
        }

        config.entities = vec![entity("Presentation", &["title", "comment"])];
        assert!(validate(&config).is_ok());
    }
}
