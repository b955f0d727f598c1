//! Token issuance bound to one entity type.

use std::collections::BTreeMap;

use crudcap_storage::{Record, RecordId};
use serde::Serialize;

use crate::command::{CommandSpec, CrudCommand};
use crate::error::CapabilityResult;
use crate::token::{NO_FIELDS, TokenCodec};

/// Issues CRUD tokens for a single namespace.
///
/// The `*_token` methods address a record by id; the `*_token_for` methods
/// take an already-loaded [`Record`] and use its id.
#[derive(Debug, Clone, Copy)]
pub struct TokenIssuer<'a> {
    codec: &'a TokenCodec,
    namespace: &'a str,
}

/// Which token kinds [`TokenIssuer::combined`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct CombinedOptions {
    /// Issue a create token (off by default).
    pub create: bool,
    /// Issue read tokens.
    pub read: bool,
    /// Issue update tokens.
    pub update: bool,
    /// Issue duplicate tokens.
    pub duplicate: bool,
    /// Issue delete tokens.
    pub delete: bool,
}

impl Default for CombinedOptions {
    fn default() -> Self {
        Self {
            create: false,
            read: true,
            update: true,
            duplicate: true,
            delete: true,
        }
    }
}

/// Output of [`TokenIssuer::combined`]. A `None` entry was switched off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombinedTokens {
    /// Single create token.
    pub create: Option<String>,
    /// Read token per record id.
    pub read: Option<BTreeMap<RecordId, String>>,
    /// Update token per record id.
    pub update: Option<BTreeMap<RecordId, String>>,
    /// Duplicate token per record id.
    pub duplicate: Option<BTreeMap<RecordId, String>>,
    /// Delete token per record id.
    pub delete: Option<BTreeMap<RecordId, String>>,
}

impl TokenCodec {
    /// An issuer for `namespace`, usually an entity type name.
    #[must_use]
    pub fn issuer<'a>(&'a self, namespace: &'a str) -> TokenIssuer<'a> {
        TokenIssuer::new(self, namespace)
    }
}

impl<'a> TokenIssuer<'a> {
    /// Bind `codec` to `namespace`.
    #[must_use]
    pub fn new(codec: &'a TokenCodec, namespace: &'a str) -> Self {
        Self { codec, namespace }
    }

    /// The namespace tokens are issued for.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.namespace
    }

    /// Token allowing creation of a record with `fields`.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn create_token<F: AsRef<str>>(&self, fields: &[F]) -> CapabilityResult<String> {
        self.issue(CommandSpec::from(CrudCommand::Create), fields)
    }

    /// Token allowing `fields` of record `id` to be read.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn read_token<F: AsRef<str>>(&self, id: RecordId, fields: &[F]) -> CapabilityResult<String> {
        self.issue(targeted(CrudCommand::Read, id), fields)
    }

    /// Token allowing `fields` of record `id` to be updated.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn update_token<F: AsRef<str>>(
        &self,
        id: RecordId,
        fields: &[F],
    ) -> CapabilityResult<String> {
        self.issue(targeted(CrudCommand::Update, id), fields)
    }

    /// Token allowing record `id` to be duplicated, overriding `fields`.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn duplicate_token<F: AsRef<str>>(
        &self,
        id: RecordId,
        fields: &[F],
    ) -> CapabilityResult<String> {
        self.issue(targeted(CrudCommand::Duplicate, id), fields)
    }

    /// Token allowing record `id` to be deleted.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn delete_token(&self, id: RecordId) -> CapabilityResult<String> {
        self.issue(targeted(CrudCommand::Delete, id), &NO_FIELDS)
    }

    /// [`read_token`](Self::read_token) for a loaded record.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn read_token_for<F: AsRef<str>>(
        &self,
        record: &Record,
        fields: &[F],
    ) -> CapabilityResult<String> {
        self.read_token(record.id(), fields)
    }

    /// [`update_token`](Self::update_token) for a loaded record.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn update_token_for<F: AsRef<str>>(
        &self,
        record: &Record,
        fields: &[F],
    ) -> CapabilityResult<String> {
        self.update_token(record.id(), fields)
    }

    /// [`duplicate_token`](Self::duplicate_token) for a loaded record.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn duplicate_token_for<F: AsRef<str>>(
        &self,
        record: &Record,
        fields: &[F],
    ) -> CapabilityResult<String> {
        self.duplicate_token(record.id(), fields)
    }

    /// [`delete_token`](Self::delete_token) for a loaded record.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenCodec::encode`] errors.
    pub fn delete_token_for(&self, record: &Record) -> CapabilityResult<String> {
        self.delete_token(record.id())
    }

    /// Issue a set of tokens for several records at once.
    ///
    /// Read tokens carry `read_fields`. Create, update and duplicate tokens
    /// carry `write_fields`, or `read_fields` when `None`.
    ///
    /// # Errors
    ///
    /// Propagates the first [`TokenCodec::encode`] error.
    pub fn combined<F: AsRef<str>>(
        &self,
        ids: &[RecordId],
        read_fields: &[F],
        write_fields: Option<&[F]>,
        options: CombinedOptions,
    ) -> CapabilityResult<CombinedTokens> {
        let write_fields = write_fields.unwrap_or(read_fields);

        let per_id = |enabled: bool,
                      issue: &dyn Fn(RecordId) -> CapabilityResult<String>|
         -> CapabilityResult<Option<BTreeMap<RecordId, String>>> {
            if !enabled {
                return Ok(None);
            }
            ids.iter()
                .map(|&id| issue(id).map(|token| (id, token)))
                .collect::<CapabilityResult<BTreeMap<_, _>>>()
                .map(Some)
        };

        Ok(CombinedTokens {
            create: if options.create {
                Some(self.create_token(write_fields)?)
            } else {
                None
            },
            read: per_id(options.read, &|id| self.read_token(id, read_fields))?,
            update: per_id(options.update, &|id| self.update_token(id, write_fields))?,
            duplicate: per_id(options.duplicate, &|id| {
                self.duplicate_token(id, write_fields)
            })?,
            delete: per_id(options.delete, &|id| self.delete_token(id))?,
        })
    }

    fn issue<F: AsRef<str>>(&self, command: CommandSpec, fields: &[F]) -> CapabilityResult<String> {
        self.codec.encode(self.namespace, command, fields)
    }
}

fn targeted(command: CrudCommand, id: RecordId) -> CommandSpec {
    CommandSpec::from(command).with_parameter(id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crudcap_crypto::SigningSecret;
    use crudcap_storage::{EntitySchema, FieldMap};

    use super::*;
    use crate::error::CapabilityError;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SigningSecret::from_text("issuer-secret").unwrap()).unwrap()
    }

    #[test]
    fn test_create_token_prefix() {
        let codec = codec();
        let token = codec
            .issuer("Presentation")
            .create_token(&["title", "comment"])
            .unwrap();
        assert!(token.starts_with("Presentation::create::ALLOW::title:comment:::"));
    }

    #[test]
    fn test_targeted_tokens_carry_id() {
        let codec = codec();
        let issuer = codec.issuer("Presentation");
        let id = RecordId(7);

        let cases = [
            (issuer.read_token(id, &["title"]).unwrap(), "read"),
            (issuer.update_token(id, &["title"]).unwrap(), "update"),
            (issuer.duplicate_token(id, &["title"]).unwrap(), "duplicate"),
            (issuer.delete_token(id).unwrap(), "delete"),
        ];
        for (token, command) in cases {
            let decoded = codec.decode(&token).unwrap();
            assert_eq!(decoded.command(), command);
            assert_eq!(decoded.record_id().unwrap(), id);
        }

        let delete = codec.decode(&issuer.delete_token(id).unwrap()).unwrap();
        assert!(delete.fields().is_empty());
    }

    #[test]
    fn test_record_bound_tokens_match_id_bound() {
        let codec = codec();
        let issuer = codec.issuer("Presentation");
        let schema = Arc::new(EntitySchema::new("Presentation").with_field("title"));
        let record = Record::new(RecordId(3), schema, FieldMap::new());

        assert_eq!(
            issuer.read_token_for(&record, &["title"]).unwrap(),
            issuer.read_token(RecordId(3), &["title"]).unwrap()
        );
        assert_eq!(
            issuer.update_token_for(&record, &["title"]).unwrap(),
            issuer.update_token(RecordId(3), &["title"]).unwrap()
        );
        assert_eq!(
            issuer.duplicate_token_for(&record, &["title"]).unwrap(),
            issuer.duplicate_token(RecordId(3), &["title"]).unwrap()
        );
        assert_eq!(
            issuer.delete_token_for(&record).unwrap(),
            issuer.delete_token(RecordId(3)).unwrap()
        );
    }

    #[test]
    fn test_combined_defaults() {
        let codec = codec();
        let ids = [RecordId(1), RecordId(2)];
        let tokens = codec
            .issuer("Presentation")
            .combined(&ids, &["title"], None, CombinedOptions::default())
            .unwrap();

        assert!(tokens.create.is_none());
        let read = tokens.read.unwrap();
        assert_eq!(read.len(), 2);
        let decoded = codec.decode(&read[&RecordId(2)]).unwrap();
        assert_eq!(decoded.command(), "read");
        assert!(decoded.allowed("title"));

        // Write fields default to the read fields.
        let update = tokens.update.unwrap();
        assert!(codec.decode(&update[&RecordId(1)]).unwrap().allowed("title"));
        assert_eq!(tokens.duplicate.unwrap().len(), 2);
        assert_eq!(tokens.delete.unwrap().len(), 2);
    }

    #[test]
    fn test_combined_toggles_and_write_fields() {
        let codec = codec();
        let options = CombinedOptions {
            create: true,
            read: false,
            delete: false,
            ..CombinedOptions::default()
        };
        let tokens = codec
            .issuer("Presentation")
            .combined(&[RecordId(5)], &["title"], Some(&["comment"][..]), options)
            .unwrap();

        assert!(tokens.read.is_none());
        assert!(tokens.delete.is_none());

        let create = codec.decode(&tokens.create.unwrap()).unwrap();
        assert!(create.allowed("comment"));
        assert!(!create.allowed("title"));

        let update = tokens.update.unwrap();
        let decoded = codec.decode(&update[&RecordId(5)]).unwrap();
        assert!(decoded.allowed("comment"));
        assert!(!decoded.allowed("title"));
    }

    #[test]
    fn test_combined_serializes_disabled_as_null() {
        let codec = codec();
        let tokens = codec
            .issuer("Presentation")
            .combined(&[RecordId(1)], &["title"], None, CombinedOptions::default())
            .unwrap();
        let json = serde_json::to_value(&tokens).unwrap();
        assert!(json["create"].is_null());
        assert!(json["read"]["1"].is_string());
    }

    #[test]
    fn test_short_namespace_rejected() {
        let codec = codec();
        assert!(matches!(
            codec.issuer("P").create_token(&["title"]),
            Err(CapabilityError::Definition(_))
        ));
    }
}
