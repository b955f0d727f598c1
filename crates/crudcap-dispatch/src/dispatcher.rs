//! Token-gated command execution against one entity store.

use std::sync::Arc;

use crudcap_capabilities::{
    CapabilityError, CapabilityToken, CrudCommand, TokenCodec, TokenIssuer,
};
use crudcap_storage::{EntityStore, FieldMap, ID_FIELD, RecordId};
use tracing::{debug, info, warn};

use crate::error::{DispatchError, DispatchResult};
use crate::params::{Params, field_names, field_values};

/// Executes CRUD tokens for a single entity type.
///
/// Every call verifies the token, checks that it was issued for this
/// entity type, checks each named field against the token's allow-list and
/// only then touches the store.
#[derive(Clone)]
pub struct CommandDispatcher {
    codec: Arc<TokenCodec>,
    store: Arc<dyn EntityStore>,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("entity", &self.entity_type())
            .finish_non_exhaustive()
    }
}

impl CommandDispatcher {
    /// Bind a codec to a store.
    #[must_use]
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn EntityStore>) -> Self {
        Self { codec, store }
    }

    /// Entity type this dispatcher serves.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        self.store.entity_type()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// The token codec.
    #[must_use]
    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// An issuer for tokens this dispatcher accepts.
    #[must_use]
    pub fn issuer(&self) -> TokenIssuer<'_> {
        self.codec.issuer(self.entity_type())
    }

    /// Verify `token` and run its command with `params`.
    ///
    /// | command   | params                     | result                      |
    /// |-----------|----------------------------|-----------------------------|
    /// | create    | field values               | `{id}`                      |
    /// | read      | field names, or none       | requested fields plus `id`  |
    /// | update    | field values               | updated fields plus `id`    |
    /// | delete    | ignored                    | `{}`                        |
    /// | duplicate | field overrides            | overridden fields plus `id` |
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Token`] for signature, format, namespace, or
    ///   permission failures
    /// - [`DispatchError::Params`] for unusable params
    /// - [`DispatchError::DoesNotExist`] if the target record is absent
    /// - [`DispatchError::Schema`] if a write names an unknown field
    pub fn execute(&self, token: &str, params: impl Into<Params>) -> DispatchResult<FieldMap> {
        let token = self.codec.decode(token)?;
        if token.namespace() != self.entity_type() {
            warn!(
                token_namespace = token.namespace(),
                entity = self.entity_type(),
                "token presented to the wrong entity type"
            );
            return Err(CapabilityError::NamespaceMismatch {
                token_namespace: token.namespace().to_string(),
                entity: self.entity_type().to_string(),
            }
            .into());
        }
        let params = params.into().normalize()?;

        let command = token.crud_command().map_err(|_| {
            CapabilityError::InvalidFormat(format!("unknown command {}", token.command()))
        })?;
        debug!(entity = self.entity_type(), %command, "executing token");

        match command {
            CrudCommand::Create => self.create(&token, field_values(params)?),
            CrudCommand::Read => match params {
                None => Ok(id_only(token.record_id()?)),
                Some(params) => self.read(&token, &field_names(params)?),
            },
            CrudCommand::Update => self.update(&token, field_values(params)?),
            CrudCommand::Delete => self.delete(&token),
            CrudCommand::Duplicate => self.duplicate(&token, field_values(params)?),
        }
    }

    fn create(&self, token: &CapabilityToken, values: FieldMap) -> DispatchResult<FieldMap> {
        check_permitted(token, values.keys().map(String::as_str))?;
        let record = self.store.create(&values)?;
        info!(entity = self.entity_type(), id = %record.id(), "created record");
        Ok(id_only(record.id()))
    }

    fn read(&self, token: &CapabilityToken, names: &[String]) -> DispatchResult<FieldMap> {
        check_permitted(token, names.iter().map(String::as_str))?;
        let record = self.store.get(token.record_id()?)?;
        Ok(record.read_fields(names)?)
    }

    fn update(&self, token: &CapabilityToken, values: FieldMap) -> DispatchResult<FieldMap> {
        check_permitted(token, values.keys().map(String::as_str))?;
        let mut record = self.store.get(token.record_id()?)?;
        record.update_fields(&values)?;
        self.store.save(&record)?;
        info!(entity = self.entity_type(), id = %record.id(), fields = values.len(), "updated record");
        Ok(record.read_fields(values.keys())?)
    }

    fn delete(&self, token: &CapabilityToken) -> DispatchResult<FieldMap> {
        let id = token.record_id()?;
        self.store.get(id)?;
        if !self.store.delete(id)? {
            // Removed by someone else between lookup and delete.
            return Err(DispatchError::DoesNotExist {
                entity: self.entity_type().to_string(),
                id,
            });
        }
        info!(entity = self.entity_type(), %id, "deleted record");
        Ok(FieldMap::new())
    }

    fn duplicate(&self, token: &CapabilityToken, overrides: FieldMap) -> DispatchResult<FieldMap> {
        check_permitted(token, overrides.keys().map(String::as_str))?;
        let source = token.record_id()?;
        let record = self.store.duplicate(source, &overrides)?;
        info!(entity = self.entity_type(), %source, id = %record.id(), "duplicated record");
        Ok(record.read_fields(overrides.keys())?)
    }
}

fn check_permitted<'a>(
    token: &CapabilityToken,
    names: impl IntoIterator<Item = &'a str>,
) -> DispatchResult<()> {
    token.fields().check(names).map_err(|e| {
        warn!(namespace = token.namespace(), command = token.command(), error = %e, "permission denied");
        DispatchError::from(e)
    })
}

fn id_only(id: RecordId) -> FieldMap {
    let mut out = FieldMap::new();
    out.insert(ID_FIELD.to_string(), id.into());
    out
}
