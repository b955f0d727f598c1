//! Salted keyed-MAC signing of text values.
//!
//! A [`Signer`] appends a detached signature to a string:
//!
//! ```text
//! signed := value SEPARATOR signature
//! ```
//!
//! The signature is a BLAKE3 keyed hash of `value`, encoded as unpadded
//! URL-safe base64. The MAC key is derived from the secret and a salt, so
//! signers with different salts never accept each other's output even when
//! they share a secret.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::secret::SigningSecret;

/// Default separator between a value and its signature.
pub const DEFAULT_SEPARATOR: &str = ":";

/// Key-derivation context for signer MAC keys.
const KEY_DERIVATION_CONTEXT: &str = "crudcap 2024 signer mac key v1";

/// Size of a raw MAC, in bytes.
const MAC_LEN: usize = blake3::OUT_LEN;

/// Signs and verifies text values with a salted keyed MAC.
#[derive(Clone)]
pub struct Signer {
    key: Zeroizing<[u8; 32]>,
    separator: String,
    salt: String,
}

impl Signer {
    /// Create a signer for `salt` using the default separator.
    #[must_use]
    pub fn new(secret: &SigningSecret, salt: &str) -> Self {
        Self {
            key: derive_mac_key(secret, salt),
            separator: DEFAULT_SEPARATOR.to_string(),
            salt: salt.to_string(),
        }
    }

    /// Use a different separator between value and signature.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSeparator`] if the separator is empty or
    /// contains characters from the URL-safe base64 alphabet.
    pub fn with_separator(mut self, separator: &str) -> CryptoResult<Self> {
        let collides = separator
            .chars()
            .any(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if separator.is_empty() || collides {
            return Err(CryptoError::InvalidSeparator(separator.to_string()));
        }
        self.separator = separator.to_string();
        Ok(self)
    }

    /// The separator placed between value and signature.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The salt this signer was keyed with.
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Compute the encoded signature for `value`.
    #[must_use]
    pub fn signature(&self, value: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.mac(value).as_bytes())
    }

    /// Sign `value`, returning `value SEPARATOR signature`.
    #[must_use]
    pub fn sign(&self, value: &str) -> String {
        format!("{value}{}{}", self.separator, self.signature(value))
    }

    /// Verify a signed string and return the value part.
    ///
    /// The signature is taken after the *last* occurrence of the separator,
    /// so the value itself may contain the separator.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SignatureVerificationFailed`] if the separator is
    /// missing, the signature is malformed, or the MAC does not match.
    pub fn unsign<'a>(&self, signed: &'a str) -> CryptoResult<&'a str> {
        let (value, encoded) = signed
            .rsplit_once(self.separator.as_str())
            .ok_or(CryptoError::SignatureVerificationFailed)?;

        let raw = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;
        let bytes: [u8; MAC_LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

        // blake3::Hash equality is constant-time.
        if blake3::Hash::from(bytes) == self.mac(value) {
            Ok(value)
        } else {
            Err(CryptoError::SignatureVerificationFailed)
        }
    }

    fn mac(&self, value: &str) -> blake3::Hash {
        blake3::keyed_hash(&self.key, value.as_bytes())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("separator", &self.separator)
            .field("salt", &self.salt)
            .finish_non_exhaustive()
    }
}

/// Derive the 32-byte MAC key from `salt` and the secret.
///
/// The salt is length-prefixed so `("ab", "c…")` and `("a", "bc…")` never
/// derive the same key.
#[allow(clippy::cast_possible_truncation)]
fn derive_mac_key(secret: &SigningSecret, salt: &str) -> Zeroizing<[u8; 32]> {
    let mut hasher = blake3::Hasher::new_derive_key(KEY_DERIVATION_CONTEXT);
    hasher.update(&(salt.len() as u32).to_le_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(secret.expose());
    Zeroizing::new(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SigningSecret {
        SigningSecret::from_text("test-secret").unwrap()
    }

    #[test]
    fn test_sign_unsign() {
        let signer = Signer::new(&secret(), "token");
        let signed = signer.sign("hello");
        assert!(signed.starts_with("hello:"));
        assert_eq!(signer.unsign(&signed).unwrap(), "hello");
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = Signer::new(&secret(), "token");
        let b = Signer::new(&secret(), "token");
        assert_eq!(a.sign("value"), b.sign("value"));
    }

    #[test]
    fn test_custom_separator_and_embedded_separators() {
        let signer = Signer::new(&secret(), "token")
            .with_separator(":::")
            .unwrap();
        let signed = signer.sign("a::b:::::");
        assert_eq!(signer.unsign(&signed).unwrap(), "a::b:::::");
    }

    #[test]
    fn test_invalid_separators() {
        for sep in ["", "a", "-", "_", "x:"] {
            assert!(matches!(
                Signer::new(&secret(), "token").with_separator(sep),
                Err(CryptoError::InvalidSeparator(_))
            ));
        }
    }

    #[test]
    fn test_tampered_value_rejected() {
        let signer = Signer::new(&secret(), "token");
        let signed = signer.sign("hello");
        let tampered = signed.replacen("hello", "hellp", 1);
        assert!(matches!(
            signer.unsign(&tampered),
            Err(CryptoError::SignatureVerificationFailed)
        ));
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let signer = Signer::new(&secret(), "token");
        let signed = signer.sign("hello");
        let truncated = &signed[..signed.len().saturating_sub(1)];
        assert!(signer.unsign(truncated).is_err());
        assert!(signer.unsign("hello").is_err());
        assert!(signer.unsign("").is_err());
    }

    #[test]
    fn test_salt_separates_signers() {
        let a = Signer::new(&secret(), "token");
        let b = Signer::new(&secret(), "other");
        assert!(b.unsign(&a.sign("hello")).is_err());
    }

    #[test]
    fn test_secret_separates_signers() {
        let a = Signer::new(&secret(), "token");
        let b = Signer::new(&SigningSecret::from_text("another").unwrap(), "token");
        assert!(b.unsign(&a.sign("hello")).is_err());
    }

    #[test]
    fn test_salt_length_prefix() {
        let s1 = SigningSecret::from_text("c-secret").unwrap();
        let s2 = SigningSecret::from_text("bc-secret").unwrap();
        let a = Signer::new(&s1, "ab");
        let b = Signer::new(&s2, "a");
        assert_ne!(a.signature("x"), b.signature("x"));
    }
}
