//! Capability tokens - signed, self-describing CRUD grants.
//!
//! Wire format:
//!
//! ```text
//! signed_token   := payload ":::" signature
//! payload        := namespace "::" cmd_and_params "::" "ALLOW" "::" fields_joined
//! cmd_and_params := command (":" param)*
//! fields_joined  := field (":" field)*
//! ```
//!
//! The signature is a keyed MAC over `payload`, keyed by the process secret
//! and the fixed salt [`TOKEN_SALT`]. Nothing in a token is trusted until
//! the signature verifies.

use std::sync::Arc;

use crudcap_crypto::{Signer, SigningSecret};
use crudcap_storage::RecordId;
use tracing::{debug, warn};

use crate::command::{CommandSpec, CrudCommand};
use crate::error::{CapabilityError, CapabilityResult};
use crate::permission::PermissionSet;

/// Separator between the four payload components.
pub const SEPARATOR: &str = "::";

/// Separator between command parameters and between fields.
pub const PARAM_SEPARATOR: &str = ":";

/// Separator between payload and signature.
pub const SIGNATURE_SEPARATOR: &str = ":::";

/// Literal marker that must occupy the third payload component.
pub const ALLOW_MARKER: &str = "ALLOW";

/// Salt mixed into the signing key for capability tokens.
pub const TOKEN_SALT: &str = "token";

/// Minimum namespace length, in characters.
pub const MIN_NAMESPACE_LEN: usize = 2;

/// An empty field list, for tokens that allow no fields.
pub const NO_FIELDS: [&str; 0] = [];

/// A verified, decoded capability token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityToken {
    namespace: String,
    command: String,
    parameters: Vec<String>,
    fields: PermissionSet,
}

impl CapabilityToken {
    /// Entity type the token applies to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Command name, without parameters.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Command parameters, in order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Number of command parameters.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    /// The field allow-list.
    #[must_use]
    pub fn fields(&self) -> &PermissionSet {
        &self.fields
    }

    /// Whether the token allows `field`.
    #[must_use]
    pub fn allowed(&self, field: &str) -> bool {
        self.fields.allows(field)
    }

    /// The command as one of the five CRUD operations.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidFormat`] for any other command name.
    pub fn crud_command(&self) -> CapabilityResult<CrudCommand> {
        self.command.parse()
    }

    /// The target record identifier (first parameter).
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidFormat`] if there is no parameter or
    /// it is not an integer.
    pub fn record_id(&self) -> CapabilityResult<RecordId> {
        let raw = self.parameters.first().ok_or_else(|| {
            CapabilityError::InvalidFormat(format!(
                "{} token carries no record id",
                self.command
            ))
        })?;
        raw.parse().map_err(|_| {
            CapabilityError::InvalidFormat(format!("invalid record id parameter {raw:?}"))
        })
    }
}

/// Encodes and decodes signed capability tokens.
///
/// The codec holds the only piece of shared state in the system: the MAC key
/// derived from the process secret. It is cheap to share behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct TokenCodec {
    signer: Signer,
}

impl TokenCodec {
    /// Create a codec keyed by `secret` and the fixed token salt.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Crypto`] if the signer cannot be built.
    pub fn new(secret: &SigningSecret) -> CapabilityResult<Self> {
        let signer = Signer::new(secret, TOKEN_SALT).with_separator(SIGNATURE_SEPARATOR)?;
        Ok(Self { signer })
    }

    /// Convenience constructor returning a shareable codec.
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::new`].
    pub fn shared(secret: &SigningSecret) -> CapabilityResult<Arc<Self>> {
        Self::new(secret).map(Arc::new)
    }

    /// Create a signed token.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Definition`] if the namespace is shorter
    /// than [`MIN_NAMESPACE_LEN`] characters, or if any component is empty or
    /// contains a separator character.
    pub fn encode<I, F>(
        &self,
        namespace: &str,
        command: impl Into<CommandSpec>,
        fields: I,
    ) -> CapabilityResult<String>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<str>,
    {
        self.encode_with_options(namespace, command, fields, false)
    }

    /// Create a signed token, with the negative-fields option.
    ///
    /// `negative_fields = true` ("allow everything except these fields") is
    /// not implemented and always fails.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::NotImplemented`] when `negative_fields` is
    /// set, otherwise as [`encode`](Self::encode).
    pub fn encode_with_options<I, F>(
        &self,
        namespace: &str,
        command: impl Into<CommandSpec>,
        fields: I,
        negative_fields: bool,
    ) -> CapabilityResult<String>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<str>,
    {
        if negative_fields {
            return Err(CapabilityError::NotImplemented("negative field lists"));
        }
        if namespace.chars().count() < MIN_NAMESPACE_LEN {
            return Err(CapabilityError::Definition(format!(
                "namespace minimum {MIN_NAMESPACE_LEN} characters"
            )));
        }
        check_component("namespace", namespace)?;

        let command = command.into();
        check_component("command", command.name())?;
        for parameter in command.parameters() {
            check_component("command parameter", parameter)?;
        }

        let fields: Vec<String> = fields
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect();
        for field in &fields {
            check_component("field", field)?;
        }

        let mut cmd_and_params = command.name().to_string();
        for parameter in command.parameters() {
            cmd_and_params.push_str(PARAM_SEPARATOR);
            cmd_and_params.push_str(parameter);
        }

        let payload = [
            namespace,
            cmd_and_params.as_str(),
            ALLOW_MARKER,
            fields.join(PARAM_SEPARATOR).as_str(),
        ]
        .join(SEPARATOR);

        debug!(
            namespace,
            command = command.name(),
            fields = fields.len(),
            "issued capability token"
        );
        Ok(self.signer.sign(&payload))
    }

    /// Verify and parse a signed token.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidSignature`] if verification fails,
    /// or [`CapabilityError::InvalidFormat`] if the verified payload is not
    /// four components with the `ALLOW` marker.
    pub fn decode(&self, signed: &str) -> CapabilityResult<CapabilityToken> {
        let payload = self.signer.unsign(signed).map_err(|_| {
            warn!("rejected capability token with invalid signature");
            CapabilityError::InvalidSignature
        })?;

        let parts: Vec<&str> = payload.split(SEPARATOR).collect();
        let [namespace, command, marker, fields] = parts.as_slice() else {
            return Err(CapabilityError::InvalidFormat(format!(
                "expected 4 components, found {}",
                parts.len()
            )));
        };
        if *marker != ALLOW_MARKER {
            return Err(CapabilityError::InvalidFormat(format!(
                "expected {ALLOW_MARKER} marker"
            )));
        }

        let mut command_parts = command.split(PARAM_SEPARATOR).map(str::to_string);
        let command_name = command_parts.next().unwrap_or_default();
        let parameters = command_parts.collect();

        // "".split(":") yields [""]; an empty component means no fields.
        let fields = if fields.is_empty() {
            PermissionSet::default()
        } else {
            PermissionSet::new(fields.split(PARAM_SEPARATOR))
        };

        debug!(namespace, command = %command_name, "decoded capability token");
        Ok(CapabilityToken {
            namespace: (*namespace).to_string(),
            command: command_name,
            parameters,
            fields,
        })
    }
}

/// Reject values that would change how the payload splits.
fn check_component(what: &str, value: &str) -> CapabilityResult<()> {
    if value.is_empty() {
        return Err(CapabilityError::Definition(format!("{what} must not be empty")));
    }
    if value.contains(PARAM_SEPARATOR) {
        return Err(CapabilityError::Definition(format!(
            "{what} must not contain {PARAM_SEPARATOR:?}: {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SigningSecret::from_text("test-secret").unwrap()).unwrap()
    }

    #[test]
    fn test_create_wire_format() {
        let codec = codec();

        let token = codec.encode("myns", "mycmd", ["f1", "f2", "f3"]).unwrap();
        assert!(token.starts_with("myns::mycmd::ALLOW::f1:f2:f3:::"));

        let token = codec.encode("myns", ["acmd", "1", "2"], ["f0"]).unwrap();
        assert!(token.starts_with("myns::acmd:1:2::ALLOW::f0:::"));

        let token = codec.encode("myns", "mycmd", NO_FIELDS).unwrap();
        assert!(token.starts_with("myns::mycmd::ALLOW:::::"));
    }

    #[test]
    fn test_definition_errors() {
        let codec = codec();
        assert!(matches!(
            codec.encode("m", "mycmd", ["1"]),
            Err(CapabilityError::Definition(_))
        ));
        assert!(matches!(
            codec.encode("", "mycmd", NO_FIELDS),
            Err(CapabilityError::Definition(_))
        ));
        assert!(matches!(
            codec.encode("my:ns", "mycmd", NO_FIELDS),
            Err(CapabilityError::Definition(_))
        ));
        assert!(matches!(
            codec.encode("myns", "mycmd", ["a:b"]),
            Err(CapabilityError::Definition(_))
        ));
        assert!(matches!(
            codec.encode("myns", "mycmd", [""]),
            Err(CapabilityError::Definition(_))
        ));
        assert!(matches!(
            codec.encode("myns", ["read", "1:2"], NO_FIELDS),
            Err(CapabilityError::Definition(_))
        ));
        assert!(matches!(
            codec.encode("myns", ["read", ""], NO_FIELDS),
            Err(CapabilityError::Definition(_))
        ));
        assert!(matches!(
            codec.encode("myns", "", NO_FIELDS),
            Err(CapabilityError::Definition(_))
        ));
    }

    #[test]
    fn test_namespace_length_counts_characters() {
        // Two characters, more than two bytes.
        assert!(codec().encode("éé", "read", NO_FIELDS).is_ok());
    }

    #[test]
    fn test_negative_fields_not_implemented() {
        assert!(matches!(
            codec().encode_with_options("myns", "mycmd", ["1"], true),
            Err(CapabilityError::NotImplemented(_))
        ));
        // Fails even when the rest of the definition is invalid.
        assert!(matches!(
            codec().encode_with_options("m", "mycmd", ["1"], true),
            Err(CapabilityError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_decode_accessors() {
        let codec = codec();
        let token = codec.encode("myns", "mycmd", ["f1", "f2", "f3"]).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded.namespace(), "myns");
        assert_eq!(decoded.command(), "mycmd");
        assert!(decoded.parameters().is_empty());
        assert_eq!(decoded.num_parameters(), 0);

        let token = codec
            .encode("myns", ["mycmd", "1", "2"], ["f1", "f2", "f3"])
            .unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded.parameters(), ["1", "2"]);
        assert_eq!(decoded.num_parameters(), 2);
    }

    #[test]
    fn test_decode_fields() {
        let codec = codec();
        let token = codec.encode("myns", "mycmd", ["f1", "f2", "f3"]).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert!(decoded.allowed("f1"));
        assert!(!decoded.allowed("x"));

        let token = codec.encode("myns", "mycmd", NO_FIELDS).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert!(decoded.fields().is_empty());
        assert!(!decoded.allowed(""));
    }

    #[test]
    fn test_truncated_token_signature_error() {
        let codec = codec();
        let token = codec.encode("myns", "mycmd", ["f1"]).unwrap();
        let truncated = &token[..token.len().saturating_sub(1)];
        assert!(matches!(
            codec.decode(truncated),
            Err(CapabilityError::InvalidSignature)
        ));
    }

    #[test]
    fn test_every_payload_character_is_protected() {
        let codec = codec();
        let token = codec.encode("myns", ["read", "7"], ["title"]).unwrap();
        let (payload, _) = token.rsplit_once(SIGNATURE_SEPARATOR).unwrap();

        for (i, c) in payload.char_indices() {
            let replacement = if c == 'x' { 'y' } else { 'x' };
            let mut tampered = token.clone();
            tampered.replace_range(i..=i, &replacement.to_string());
            assert!(
                matches!(codec.decode(&tampered), Err(CapabilityError::InvalidSignature)),
                "tampering at {i} was not detected"
            );
        }
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = codec().encode("myns", "read", ["f1"]).unwrap();
        let other = TokenCodec::new(&SigningSecret::from_text("other").unwrap()).unwrap();
        assert!(matches!(
            other.decode(&token),
            Err(CapabilityError::InvalidSignature)
        ));
    }

    #[test]
    fn test_format_errors_after_valid_signature() {
        let secret = SigningSecret::from_text("test-secret").unwrap();
        let codec = TokenCodec::new(&secret).unwrap();
        let raw = Signer::new(&secret, TOKEN_SALT)
            .with_separator(SIGNATURE_SEPARATOR)
            .unwrap();

        assert!(matches!(
            codec.decode(&raw.sign("myns::read::ALLOW")),
            Err(CapabilityError::InvalidFormat(_))
        ));
        assert!(matches!(
            codec.decode(&raw.sign("myns::read::ALLOW::a::b")),
            Err(CapabilityError::InvalidFormat(_))
        ));
        assert!(matches!(
            codec.decode(&raw.sign("myns::read::DENY::title")),
            Err(CapabilityError::InvalidFormat(_))
        ));
        assert!(codec.decode(&raw.sign("myns::read::ALLOW::title")).is_ok());
    }

    #[test]
    fn test_record_id() {
        let codec = codec();
        let token = codec.encode("myns", ["read", "42"], NO_FIELDS).unwrap();
        assert_eq!(codec.decode(&token).unwrap().record_id().unwrap(), RecordId(42));

        let token = codec.encode("myns", "read", NO_FIELDS).unwrap();
        assert!(matches!(
            codec.decode(&token).unwrap().record_id(),
            Err(CapabilityError::InvalidFormat(_))
        ));

        let token = codec.encode("myns", ["read", "abc"], NO_FIELDS).unwrap();
        assert!(matches!(
            codec.decode(&token).unwrap().record_id(),
            Err(CapabilityError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_crud_command() {
        let codec = codec();
        let token = codec.encode("myns", ["update", "1"], NO_FIELDS).unwrap();
        assert_eq!(
            codec.decode(&token).unwrap().crud_command().unwrap(),
            CrudCommand::Update
        );
        let token = codec.encode("myns", "mycmd", NO_FIELDS).unwrap();
        assert!(codec.decode(&token).unwrap().crud_command().is_err());
    }
}
