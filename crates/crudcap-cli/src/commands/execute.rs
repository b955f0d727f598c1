//! Execute command: run one request against the configured file store.

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use crudcap_capabilities::TokenCodec;
use crudcap_config::ResolvedConfig;
use crudcap_dispatch::{ApiResponse, CommandDispatcher, CrudApi};
use serde_json::json;

use crate::config_bridge;
use crate::theme::Theme;

/// Run `token` with `params` (JSON text, `-` for stdin) and print the
/// response body.
///
/// Returns the response so the caller can pick an exit code.
pub(crate) fn execute(
    resolved: &ResolvedConfig,
    token: &str,
    params: Option<&str>,
    entity: Option<&str>,
) -> Result<ApiResponse> {
    let codec = TokenCodec::shared(&config_bridge::signing_secret(resolved)?)?;
    let token = token.trim();

    let entity = match entity {
        Some(name) => name.to_owned(),
        None => codec
            .decode(token)
            .context("cannot tell which entity the token is for; pass --entity")?
            .namespace()
            .to_owned(),
    };

    let params = match params {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read params from stdin")?;
            Some(text)
        },
        Some(text) => Some(text.to_owned()),
        None => None,
    };

    let store = config_bridge::open_store(&resolved.config, &entity)?;
    let api = CrudApi::new(CommandDispatcher::new(codec, Arc::new(store)));

    let body = json!({ "token": token, "params": params });
    let response = api.handle("POST", body.to_string().as_bytes());

    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if let Some(message) = response.errmsg() {
        eprintln!("{}", Theme::error(message));
    }
    Ok(response)
}
