//! Process-wide signing secret with secure memory handling.

use std::io::Write;
use std::path::Path;

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Length of a freshly generated secret, in bytes.
pub const GENERATED_SECRET_LEN: usize = 32;

/// Secret key material shared by every token issuer and verifier in a process.
///
/// The bytes are zeroized on drop. The secret is never printed by `Debug`;
/// use [`SigningSecret::key_id_hex`] to identify it in logs.
#[derive(Clone)]
pub struct SigningSecret {
    bytes: Zeroizing<Vec<u8>>,
}

impl SigningSecret {
    /// Create a secret from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] if `bytes` is empty.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self {
            bytes: Zeroizing::new(bytes.to_vec()),
        })
    }

    /// Create a secret from a configuration string (used as UTF-8 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] if the string is empty.
    pub fn from_text(text: &str) -> CryptoResult<Self> {
        Self::from_bytes(text.as_bytes())
    }

    /// Decode a secret from a hex string.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidHexEncoding`] on malformed hex, or
    /// [`CryptoError::EmptySecret`] if it decodes to nothing.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes =
            Zeroizing::new(hex::decode(s.trim()).map_err(|_| CryptoError::InvalidHexEncoding)?);
        Self::from_bytes(&bytes)
    }

    /// Generate a new random secret.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; GENERATED_SECRET_LEN]);
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Raw secret bytes (careful - sensitive!).
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    /// Encode the secret as hex (careful - sensitive!).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes.as_slice())
    }

    /// Short, non-reversible identifier for the secret.
    ///
    /// First 8 bytes of the BLAKE3 hash of the key material.
    #[must_use]
    pub fn key_id(&self) -> [u8; 8] {
        let hash = blake3::hash(&self.bytes);
        let mut id = [0u8; 8];
        id.copy_from_slice(&hash.as_bytes()[..8]);
        id
    }

    /// Get the key ID as a hex string.
    #[must_use]
    pub fn key_id_hex(&self) -> String {
        hex::encode(self.key_id())
    }

    /// Load a hex-encoded secret from a file, or generate and save a new one.
    ///
    /// New files are created atomically with mode 0o600 on Unix. Symlinks are
    /// refused on the read path.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IoError`] on I/O failures or symlink detection,
    /// and a decoding error if the file contents are not a valid secret.
    pub fn load_or_generate(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CryptoError::IoError(e.to_string()))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(path)
            {
                Ok(mut file) => {
                    let secret = Self::generate();
                    let encoded = Zeroizing::new(secret.to_hex());
                    file.write_all(encoded.as_bytes())
                        .map_err(|e| CryptoError::IoError(e.to_string()))?;
                    return Ok(secret);
                },
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {},
                Err(e) => return Err(CryptoError::IoError(e.to_string())),
            }
        }

        #[cfg(not(unix))]
        if !path.exists() {
            let secret = Self::generate();
            let encoded = Zeroizing::new(secret.to_hex());
            let mut file =
                std::fs::File::create(path).map_err(|e| CryptoError::IoError(e.to_string()))?;
            file.write_all(encoded.as_bytes())
                .map_err(|e| CryptoError::IoError(e.to_string()))?;
            return Ok(secret);
        }

        let meta =
            std::fs::symlink_metadata(path).map_err(|e| CryptoError::IoError(e.to_string()))?;
        if meta.file_type().is_symlink() {
            return Err(CryptoError::IoError(
                "refusing to read secret file: path is a symlink".into(),
            ));
        }

        let contents = Zeroizing::new(
            std::fs::read_to_string(path).map_err(|e| CryptoError::IoError(e.to_string()))?,
        );
        Self::from_hex(&contents)
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("key_id", &self.key_id_hex())
            .finish_non_exhaustive()
    }
}
