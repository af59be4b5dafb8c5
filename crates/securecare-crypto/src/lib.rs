//! # SecureCare Crypto
//!
//! Cryptographic primitives for the SecureCare document store.
//!
//! This crate provides:
//! - **Content encryption**: AES-256-GCM over file payloads, one fresh
//!   key per file
//! - **Key wrapping**: DEKs encrypted under a single long-lived master
//!   secret, stored alongside the file metadata
//!
//! ## Security Model
//!
//! Envelope encryption: every file is encrypted with its own 256-bit
//! Data Encryption Key (DEK), and only the wrapped form of the DEK is
//! ever persisted. The blob store sees ciphertext only; compromising it
//! does not reveal plaintext without the master secret.
//!
//! The durable blob layout is `nonce[12] || ciphertext || tag[16]`.
//! There is no algorithm header and no key-id: the format is fixed to
//! AES-256-GCM and a single active master secret.

pub mod cipher;
pub mod error;
pub mod keys;
pub mod wrap;

pub use cipher::{decrypt, encrypt};
pub use error::{CryptoError, Result};
pub use keys::{FileKey, BLOB_OVERHEAD, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use wrap::{MasterKey, WrappedKey};
