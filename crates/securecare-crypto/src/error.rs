//! Error types for the securecare-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Encryption failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Invalid key format or length
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Ciphertext too short to contain a nonce and tag
    #[error("invalid ciphertext: {0} bytes is too short")]
    InvalidCiphertext(usize),

    /// AEAD tag verification failed
    #[error("ciphertext failed integrity verification")]
    Integrity,

    /// A wrapped key token could not be unwrapped. Deliberately carries
    /// no detail: malformed, tampered, and wrong-master-secret tokens
    /// are indistinguishable to the caller.
    #[error("wrapped key is invalid")]
    InvalidWrappedKey,

    /// Missing or malformed configuration (startup-fatal)
    #[error("configuration error: {0}")]
    Configuration(String),
}
