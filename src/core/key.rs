//! Key derivation for token encryption.
//!
//! The CDN is configured with a key string; the AES-256 key is the
//! SHA-256 digest of its UTF-8 bytes.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::EcTokenError;

/// Size of the derived AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// A derived AES-256 key.
///
/// The key bytes are zeroed when dropped and never shown by `Debug`.
#[derive(Clone)]
pub struct TokenKey {
    bytes: Zeroizing<[u8; KEY_SIZE]>,
}

impl TokenKey {
    /// Derive a key from the configured key string.
    ///
    /// # Errors
    ///
    /// Returns [`EcTokenError::EmptyKey`] if the string is empty or only
    /// whitespace.
    pub fn derive(secret: &str) -> Result<Self, EcTokenError> {
        if secret.trim().is_empty() {
            return Err(EcTokenError::EmptyKey);
        }

        let digest = Sha256::digest(secret.as_bytes());
        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
        bytes.copy_from_slice(&digest);

        Ok(Self { bytes })
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
