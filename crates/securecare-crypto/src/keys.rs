//! Per-file Data Encryption Keys (DEKs)
//!
//! A `FileKey` is generated fresh for every upload, used for exactly one
//! encryption, and exists in plaintext only for the duration of the
//! request that holds it. The persisted form is always the wrapped token
//! produced by [`crate::wrap::MasterKey::wrap`].

use crate::{CryptoError, Result};
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Fixed overhead an encrypted blob adds over its plaintext
pub const BLOB_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// A per-file Data Encryption Key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FileKey {
    key: [u8; KEY_SIZE],
}

impl FileKey {
    /// Generate a new random key from the OS CSPRNG
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut key);
        Self { key }
    }

    /// Create a key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "file key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { key })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_differ() {
        let k1 = FileKey::generate();
        let k2 = FileKey::generate();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let k = FileKey::generate();
        let restored = FileKey::from_bytes(k.as_bytes()).unwrap();
        assert_eq!(k.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert!(matches!(
            FileKey::from_bytes(&[0u8; 16]),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(matches!(
            FileKey::from_bytes(&[]),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_debug_does_not_print_key_material() {
        let k = FileKey::from_bytes(&[0xAB; KEY_SIZE]).unwrap();
        let rendered = format!("{:?}", k);
        assert!(!rendered.contains("ab"));
        assert!(!rendered.contains("AB"));
    }
}
