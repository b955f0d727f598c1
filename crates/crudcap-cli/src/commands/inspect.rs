//! Inspect command: verify a token and show what it grants.

use anyhow::{Context, Result};
use crudcap_capabilities::TokenCodec;
use crudcap_config::ResolvedConfig;

use crate::config_bridge;
use crate::theme::Theme;

/// Verify `token` against the configured secret and print its contents.
pub(crate) fn inspect(resolved: &ResolvedConfig, token: &str) -> Result<()> {
    let codec = TokenCodec::new(&config_bridge::signing_secret(resolved)?)?;
    let decoded = codec.decode(token.trim()).context("token rejected")?;

    let parameters = if decoded.parameters().is_empty() {
        Theme::dimmed("(none)")
    } else {
        decoded.parameters().join(", ")
    };
    let fields = if decoded.fields().is_empty() {
        Theme::dimmed("(none)")
    } else {
        decoded.fields().iter().collect::<Vec<_>>().join(", ")
    };

    println!("\n{}", Theme::header("Capability Token"));
    println!("{}", Theme::kv("Namespace", decoded.namespace()));
    println!("{}", Theme::kv("Command", decoded.command()));
    println!("{}", Theme::kv("Parameters", &parameters));
    println!("{}", Theme::kv("Fields", &fields));
    println!("{}", Theme::success("Signature valid"));
    println!();
    Ok(())
}
