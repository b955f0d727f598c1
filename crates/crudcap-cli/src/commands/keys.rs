//! Keys command: create and identify signing secrets.

use std::path::Path;

use anyhow::{Context, Result, bail};
use crudcap_config::ResolvedConfig;
use crudcap_crypto::SigningSecret;

use crate::config_bridge;
use crate::theme::Theme;

/// Generate a secret. Without `out` the hex secret is printed to stdout;
/// with `out` it is written there and only its key ID is printed.
pub(crate) fn generate(out: Option<&Path>, force: bool) -> Result<()> {
    let Some(path) = out else {
        println!("{}", SigningSecret::generate().to_hex().as_str());
        return Ok(());
    };

    if path.exists() {
        if !force {
            bail!(
                "{} already exists; pass --force to replace it (existing tokens will stop verifying)",
                path.display()
            );
        }
        eprintln!(
            "{}",
            Theme::warning("Replacing existing secret. Previously issued tokens are now invalid.")
        );
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
    }

    let secret = SigningSecret::load_or_generate(path)?;
    println!("{}", Theme::success("New signing secret generated."));
    println!("{}", Theme::kv("Key ID", &secret.key_id_hex()));
    println!("{}", Theme::kv("Key file", &path.display().to_string()));
    Ok(())
}

/// Show which secret tokens are signed with.
pub(crate) fn show(resolved: &ResolvedConfig) -> Result<()> {
    let secret = config_bridge::signing_secret(resolved)?;
    let source = if resolved.config.signing.secret_key.is_some() {
        "signing.secret_key".to_owned()
    } else {
        config_bridge::secret_file_path(resolved).display().to_string()
    };

    println!("\n{}", Theme::header("Signing Secret"));
    println!("{}", Theme::kv("Key ID", &secret.key_id_hex()));
    println!("{}", Theme::kv("Source", &source));
    println!();
    Ok(())
}
