//! Error types for the securecare-store crate

use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur at the object-store boundary
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested object does not exist
    #[error("object not found: {0}")]
    NotFound(String),

    /// Network or service fault talking to the store
    #[error("object store unavailable: {0}")]
    Unavailable(String),

    /// Presigned URL generation failed
    #[error("presign failed: {0}")]
    Presign(String),
}
