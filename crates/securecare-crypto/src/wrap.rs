//! DEK wrapping under the master secret
//!
//! A [`MasterKey`] is loaded once at process start and held as read-only
//! shared state; wrap and unwrap are pure functions of (input, master
//! secret). Wrapped tokens are base64 text safe to persist next to the
//! file metadata. There is no key-id: rotating the master secret
//! invalidates every previously wrapped token.

use crate::{
    cipher::{open_with, seal_with},
    keys::{FileKey, KEY_SIZE, NONCE_SIZE},
    CryptoError, Result,
};
use base64::Engine;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

const B64: base64::engine::general_purpose::GeneralPurpose =
    base64::engine::general_purpose::STANDARD;

/// The ciphertext form of a DEK, safe to persist
#[derive(Clone, PartialEq, Eq)]
pub struct WrappedKey(String);

impl WrappedKey {
    /// Reconstruct a token read back from persistent storage
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text, as stored in the metadata row
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for WrappedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WrappedKey(..)")
    }
}

/// The single long-lived secret used to wrap and unwrap every DEK
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_SIZE],
}

impl MasterKey {
    /// Load the master key from its base64 configuration value.
    ///
    /// Fails with [`CryptoError::Configuration`]; callers treat this as
    /// startup-fatal, never as a per-request error.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        if encoded.trim().is_empty() {
            return Err(CryptoError::Configuration(
                "master key is not set".to_string(),
            ));
        }
        let bytes = B64.decode(encoded.trim()).map_err(|e| {
            CryptoError::Configuration(format!("master key is not valid base64: {}", e))
        })?;
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::Configuration(format!(
                "master key must decode to {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Generate a fresh random master key (provisioning and tests)
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut key);
        Self { key }
    }

    /// Encode the key for configuration storage
    pub fn to_base64(&self) -> String {
        B64.encode(self.key)
    }

    /// Wrap a DEK for persistence.
    ///
    /// Non-deterministic: wrapping the same DEK twice yields different
    /// tokens because each wrap draws a fresh nonce.
    pub fn wrap(&self, dek: &FileKey) -> Result<WrappedKey> {
        let sealed = seal_with(&self.key, dek.as_bytes())?;
        Ok(WrappedKey(B64.encode(sealed)))
    }

    /// Recover a DEK from its wrapped token.
    ///
    /// Every failure mode (malformed token, tampering, a different
    /// master secret) collapses to [`CryptoError::InvalidWrappedKey`].
    pub fn unwrap(&self, wrapped: &WrappedKey) -> Result<FileKey> {
        let sealed = B64
            .decode(wrapped.as_str())
            .map_err(|_| CryptoError::InvalidWrappedKey)?;
        if sealed.len() < NONCE_SIZE + 1 {
            return Err(CryptoError::InvalidWrappedKey);
        }
        let dek_bytes = open_with(&self.key, &sealed).map_err(|_| CryptoError::InvalidWrappedKey)?;
        FileKey::from_bytes(&dek_bytes).map_err(|_| CryptoError::InvalidWrappedKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let master = MasterKey::generate();
        let dek = FileKey::generate();

        let wrapped = master.wrap(&dek).unwrap();
        let recovered = master.unwrap(&wrapped).unwrap();

        assert_eq!(dek.as_bytes(), recovered.as_bytes());
    }

    #[test]
    fn test_wrap_is_nondeterministic() {
        let master = MasterKey::generate();
        let dek = FileKey::generate();

        let a = master.wrap(&dek).unwrap();
        let b = master.wrap(&dek).unwrap();

        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_unwrap_rejects_tampered_token() {
        let master = MasterKey::generate();
        let wrapped = master.wrap(&FileKey::generate()).unwrap();

        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(wrapped.as_str())
            .unwrap();
        raw[NONCE_SIZE + 3] ^= 0x01;
        let tampered = WrappedKey::from_token(
            base64::engine::general_purpose::STANDARD.encode(raw),
        );

        assert!(matches!(
            master.unwrap(&tampered),
            Err(CryptoError::InvalidWrappedKey)
        ));
    }

    #[test]
    fn test_unwrap_rejects_wrong_master_key() {
        let wrapped = MasterKey::generate().wrap(&FileKey::generate()).unwrap();
        let other = MasterKey::generate();

        assert!(matches!(
            other.unwrap(&wrapped),
            Err(CryptoError::InvalidWrappedKey)
        ));
    }

    #[test]
    fn test_unwrap_rejects_malformed_token() {
        let master = MasterKey::generate();
        for garbage in ["", "not base64 at all!", "AAAA", "c2hvcnQ="] {
            assert!(matches!(
                master.unwrap(&WrappedKey::from_token(garbage)),
                Err(CryptoError::InvalidWrappedKey)
            ));
        }
    }

    #[test]
    fn test_from_base64_roundtrip() {
        let master = MasterKey::generate();
        let restored = MasterKey::from_base64(&master.to_base64()).unwrap();

        let dek = FileKey::generate();
        let wrapped = master.wrap(&dek).unwrap();
        assert_eq!(
            restored.unwrap(&wrapped).unwrap().as_bytes(),
            dek.as_bytes()
        );
    }

    #[test]
    fn test_from_base64_rejects_bad_config() {
        assert!(matches!(
            MasterKey::from_base64(""),
            Err(CryptoError::Configuration(_))
        ));
        assert!(matches!(
            MasterKey::from_base64("   "),
            Err(CryptoError::Configuration(_))
        ));
        assert!(matches!(
            MasterKey::from_base64("!!!not-base64!!!"),
            Err(CryptoError::Configuration(_))
        ));
        // Valid base64, wrong length
        assert!(matches!(
            MasterKey::from_base64("c2hvcnQ="),
            Err(CryptoError::Configuration(_))
        ));
    }
}
