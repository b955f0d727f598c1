//! Environment variable fallback and `${VAR}` reference resolution.
//!
//! Env vars are fallbacks, not overrides: they only fill fields that no
//! config file set.

use std::collections::HashMap;
use std::fmt::Write as _;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    /// A field that, once set by a file, makes this fallback inapplicable.
    excluded_by: Option<&'static str>,
}

/// All supported `CRUDCAP_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "CRUDCAP_SECRET_KEY",
        field_path: "signing.secret_key",
        excluded_by: Some("signing.secret_key_file"),
    },
    EnvMapping {
        var_name: "CRUDCAP_LOG_LEVEL",
        field_path: "logging.level",
        excluded_by: None,
    },
    EnvMapping {
        var_name: "CRUDCAP_STORE_PATH",
        field_path: "store.path",
        excluded_by: None,
    },
];

/// Supported env vars and the config fields they fill, as
/// `(var_name, field_path)` pairs.
pub fn env_fallbacks() -> impl Iterator<Item = (&'static str, &'static str)> {
    ENV_MAPPINGS.iter().map(|m| (m.var_name, m.field_path))
}

/// Apply environment variable fallbacks to fields no file layer set.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        // Defaults may be replaced; file layers may not.
        if set_by_file(sources, mapping.field_path) {
            continue;
        }
        if let Some(excluded_by) = mapping
            .excluded_by
            .filter(|path| set_by_file(sources, path))
        {
            debug!(
                var = mapping.var_name,
                field = excluded_by,
                "env var fallback skipped, alternative set in config"
            );
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );
            if set_field(merged, mapping.field_path, toml::Value::String(val.clone())) {
                sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
                count = count.saturating_add(1);
            }
        }
    }

    count
}

fn set_by_file(sources: &FieldSources, path: &str) -> bool {
    sources
        .get(path)
        .is_some_and(|layer| *layer != ConfigLayer::Defaults)
}

/// Resolve `${VAR}` references within string values in the config tree.
///
/// References that don't resolve are left as-is.
pub fn resolve_env_references<S: ::std::hash::BuildHasher>(
    val: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) {
    match val {
        toml::Value::String(s) => {
            *s = resolve_string_refs(s, env_vars);
        },
        toml::Value::Table(table) => {
            let keys: Vec<String> = table.keys().cloned().collect();
            for key in keys {
                if let Some(child) = table.get_mut(&key) {
                    resolve_env_references(child, env_vars);
                }
            }
        },
        toml::Value::Array(arr) => {
            for child in arr.iter_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        _ => {},
    }
}

/// Replace `${VAR}` references in a string with their env var values.
fn resolve_string_refs<S: ::std::hash::BuildHasher>(
    input: &str,
    env_vars: &HashMap<String, String, S>,
) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;

            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }

            if closed && !var_name.is_empty() {
                if let Some(val) = env_vars.get(&var_name) {
                    result.push_str(val);
                } else {
                    debug!(var = var_name, "unresolved env var reference in config");
                    let _ = write!(result, "${{{var_name}}}");
                }
            } else {
                // Malformed reference.
                result.push_str("${");
                result.push_str(&var_name);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Set a dotted field, creating intermediate tables. Returns `false` if a
/// non-table value is in the way.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) -> bool {
    let mut segments = path.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        let Some(table) = current.as_table_mut() else {
            return false;
        };
        if segments.peek().is_none() {
            table.insert(segment.to_owned(), value);
            return true;
        }
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
    false
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
