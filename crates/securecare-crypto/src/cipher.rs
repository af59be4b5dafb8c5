//! Authenticated content encryption
//!
//! Produces and consumes the durable blob layout
//! `nonce[12] || ciphertext || tag[16]`. Every call to [`encrypt`] draws
//! a fresh random nonce; a (key, nonce) pair is never reused because
//! every key encrypts exactly one payload.

use crate::{
    keys::{FileKey, KEY_SIZE, NONCE_SIZE},
    CryptoError, Result,
};
use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit, Nonce};
use rand::rngs::OsRng;

/// Encrypt with the given raw key, returning `nonce || ciphertext || tag`.
pub(crate) fn seal_with(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut nonce = [0u8; NONCE_SIZE];
    rand::RngCore::fill_bytes(&mut OsRng, &mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a `nonce || ciphertext || tag` blob with the given raw key.
pub(crate) fn open_with(key: &[u8; KEY_SIZE], blob: &[u8]) -> Result<Vec<u8>> {
    // A valid blob holds at least the nonce plus one ciphertext/tag byte.
    if blob.len() < NONCE_SIZE + 1 {
        return Err(CryptoError::InvalidCiphertext(blob.len()));
    }
    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Integrity)
}

/// Encrypt a file payload with its per-file key.
///
/// Empty plaintext is valid input and produces a 28-byte blob.
pub fn encrypt(plaintext: &[u8], key: &FileKey) -> Result<Vec<u8>> {
    seal_with(key.as_bytes(), plaintext)
}

/// Decrypt a file blob with its per-file key.
///
/// Fails with [`CryptoError::Integrity`] when the authentication tag
/// does not verify; no partial plaintext is ever returned.
pub fn decrypt(blob: &[u8], key: &FileKey) -> Result<Vec<u8>> {
    open_with(key.as_bytes(), blob)
}
