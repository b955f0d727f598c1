//! CLI handlers for the `crudcap config` subcommand.

use anyhow::Result;
use crudcap_config::{ConfigResult, ResolvedConfig, ShowFormat, env, loader};

use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(resolved: &ResolvedConfig, format: &str) -> Result<()> {
    let show_format = match format {
        "json" => ShowFormat::Json,
        _ => ShowFormat::Toml,
    };

    let output = resolved
        .show(show_format)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

/// Validate the configuration. Returns whether it is valid.
pub(crate) fn validate_config(loaded: &ConfigResult<ResolvedConfig>) -> bool {
    match loaded {
        Ok(resolved) => {
            println!("{}", Theme::success("Configuration is valid."));
            if !resolved.loaded_files.is_empty() {
                println!("\nLoaded files:");
                for path in &resolved.loaded_files {
                    println!("  - {path}");
                }
            }
            println!("\nEntities:");
            for entity in &resolved.config.entities {
                println!("  - {} ({})", entity.name, entity.fields.join(", "));
            }
            true
        },
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("Configuration error: {e}")));
            false
        },
    }
}

/// Show the config file paths that are checked.
pub(crate) fn show_paths(resolved: &ResolvedConfig) {
    let user = loader::user_config_path(&resolved.home_dir);
    let status = if user.exists() { "found" } else { "not found" };

    println!("Configuration files checked (lowest to highest precedence):\n");
    println!("  1. (embedded defaults)");
    println!("  2. {}  [{status}]", user.display());
    println!("  3. --config <path>");

    println!("\nEnvironment variable fallbacks:");
    for (var, field) in env::env_fallbacks() {
        println!("  {var:<20} -> {field}");
    }
}
