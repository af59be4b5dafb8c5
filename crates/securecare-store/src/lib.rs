//! # SecureCare Store
//!
//! Blob storage boundary for the SecureCare document store.
//!
//! This crate provides:
//! - **ObjectStore trait**: the minimal capability set the workflows
//!   need (put, get, delete, presigned GET)
//! - **S3ObjectStore**: S3-compatible backend (Backblaze B2 in
//!   production), client built once at startup and injected
//! - **MemoryObjectStore**: in-memory backend for tests and development
//!
//! The store only ever sees ciphertext; encryption happens before `put`
//! and after `get`. Calls are attempted once per workflow step; retry
//! policy belongs to the caller, not this boundary.

pub mod error;
pub mod memory;
pub mod s3;

pub use error::{Result, StoreError};
pub use memory::MemoryObjectStore;
pub use s3::{S3Config, S3ObjectStore};

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Capability boundary to the remote blob store.
///
/// Contract assumed by the workflows: `put` is atomic from the caller's
/// perspective, `get` on a missing key fails with
/// [`StoreError::NotFound`], and any network or service fault surfaces
/// as [`StoreError::Unavailable`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object under the given key
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Fetch the entire object body
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Delete an object; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Produce a presigned GET URL serving the (encrypted) object body
    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> Result<String>;
}
