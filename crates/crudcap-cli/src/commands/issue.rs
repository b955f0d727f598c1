//! Issue command: mint tokens from the configured secret.

use anyhow::{Result, bail};
use crudcap_capabilities::{CombinedOptions, CrudCommand, RecordId, TokenCodec};
use crudcap_config::ResolvedConfig;

use crate::config_bridge;

/// Print one token for `command` on `entity`.
pub(crate) fn issue_token(
    resolved: &ResolvedConfig,
    entity: &str,
    command: CrudCommand,
    id: Option<i64>,
    fields: &[String],
) -> Result<()> {
    let codec = TokenCodec::new(&config_bridge::signing_secret(resolved)?)?;
    let issuer = codec.issuer(entity);

    check_target(command, id)?;
    let token = match (command, id.map(RecordId)) {
        (CrudCommand::Create, _) => issuer.create_token(fields)?,
        (_, None) => bail!("{command} tokens need --id"),
        (CrudCommand::Read, Some(id)) => issuer.read_token(id, fields)?,
        (CrudCommand::Update, Some(id)) => issuer.update_token(id, fields)?,
        (CrudCommand::Duplicate, Some(id)) => issuer.duplicate_token(id, fields)?,
        (CrudCommand::Delete, Some(id)) => {
            if !fields.is_empty() {
                tracing::warn!("delete tokens carry no fields; ignoring --field");
            }
            issuer.delete_token(id)?
        },
    };

    println!("{token}");
    Ok(())
}

/// Record-targeting commands need an id; create must not have one.
fn check_target(command: CrudCommand, id: Option<i64>) -> Result<()> {
    match (command.targets_record(), id.is_some()) {
        (true, false) => bail!("{command} tokens need --id"),
        (false, true) => bail!("{command} tokens do not take --id"),
        _ => Ok(()),
    }
}

/// Print a JSON object of tokens covering several records.
pub(crate) fn issue_combined(
    resolved: &ResolvedConfig,
    entity: &str,
    ids: &[i64],
    read_fields: &[String],
    write_fields: &[String],
    options: CombinedOptions,
) -> Result<()> {
    let codec = TokenCodec::new(&config_bridge::signing_secret(resolved)?)?;
    let ids: Vec<RecordId> = ids.iter().copied().map(RecordId).collect();
    let write_fields = (!write_fields.is_empty()).then_some(write_fields);

    let tokens = codec
        .issuer(entity)
        .combined(&ids, read_fields, write_fields, options)?;
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_target() {
        assert!(check_target(CrudCommand::Create, None).is_ok());
        assert!(check_target(CrudCommand::Create, Some(1)).is_err());
        for command in [
            CrudCommand::Read,
            CrudCommand::Update,
            CrudCommand::Delete,
            CrudCommand::Duplicate,
        ] {
            assert!(check_target(command, Some(3)).is_ok());
            let err = check_target(command, None).unwrap_err();
            assert!(err.to_string().contains("need --id"));
        }
    }
}
