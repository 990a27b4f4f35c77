//! Authenticated encryption of token plaintext.
//!
//! Wire format: unpadded base64url of `IV (12 bytes) || ciphertext || tag (16 bytes)`,
//! produced with AES-256-GCM and no associated data.
//!
//! # Security
//!
//! A fresh random IV is drawn for every encryption. Decrypted plaintext is
//! returned in a `Zeroizing` buffer.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::core::key::TokenKey;
use crate::error::EcTokenError;

/// Size of the AES-GCM IV.
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag.
pub const TAG_SIZE: usize = 16;

/// Encrypt a token plaintext with a freshly generated IV.
///
/// # Errors
///
/// Returns [`EcTokenError::EncryptionFailed`] if the cipher rejects the input.
pub fn encrypt(plaintext: &str, key: &TokenKey) -> Result<String, EcTokenError> {
    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);
    trace!("generated random IV");
    encrypt_with_iv(plaintext, key, &iv)
}

/// Encrypt a token plaintext with the given IV.
///
/// Reusing an IV under the same key breaks GCM; callers outside tests
/// should use [`encrypt`].
pub fn encrypt_with_iv(
    plaintext: &str,
    key: &TokenKey,
    iv: &[u8; IV_SIZE],
) -> Result<String, EcTokenError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| EcTokenError::EncryptionFailed)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(iv), plaintext.as_bytes())
        .map_err(|_| EcTokenError::EncryptionFailed)?;

    let mut raw = Vec::with_capacity(IV_SIZE + ciphertext.len());
    raw.extend_from_slice(iv);
    raw.extend_from_slice(&ciphertext);

    debug!(
        plaintext_len = plaintext.len(),
        encrypted_len = raw.len(),
        "encrypted token"
    );
    Ok(URL_SAFE_NO_PAD.encode(raw))
}

/// Decrypt an encrypted token back into its plaintext.
///
/// Surrounding whitespace and trailing `=` padding are tolerated.
///
/// # Errors
///
/// Returns an error if the input is not base64url, is too short to
/// contain an IV and tag, fails authentication, or does not decrypt to
/// UTF-8.
pub fn decrypt(encoded: &str, key: &TokenKey) -> Result<Zeroizing<String>, EcTokenError> {
    let trimmed = encoded.trim().trim_end_matches('=');
    let raw = URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|_| EcTokenError::Base64DecodeError)?;

    let min = IV_SIZE + TAG_SIZE;
    if raw.len() < min {
        return Err(EcTokenError::TokenTooShort {
            len: raw.len(),
            min,
        });
    }

    let (iv, ciphertext) = raw.split_at(IV_SIZE);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| EcTokenError::DecryptionFailed)?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| EcTokenError::DecryptionFailed)?,
    );
    debug!(encrypted_len = raw.len(), plaintext_len = plaintext.len(), "decrypted token");

    let text = std::str::from_utf8(&plaintext).map_err(|_| EcTokenError::InvalidUtf8)?;
    Ok(Zeroizing::new(text.to_string()))
}
