//! Error types for the securecare-core crate

use securecare_crypto::CryptoError;
use securecare_store::StoreError;
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Errors from the metadata record stores
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The store could not be reached or the statement failed
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness or foreign-key constraint was violated
    #[error("metadata conflict: {0}")]
    Conflict(String),
}

/// Result type alias using `VaultError`
pub type VaultResult<T> = std::result::Result<T, VaultError>;

/// Errors from the file vault workflows.
///
/// Each workflow step's failure aborts the remaining steps. Messages
/// never contain plaintext, key material, or wrapped-token contents.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Upload content was empty; rejected before any key material is
    /// generated
    #[error("upload is empty")]
    EmptyUpload,

    /// No file record with the given id
    #[error("file record {0} not found")]
    RecordNotFound(i64),

    /// Object-store fault. The inner `StoreError::NotFound` variant
    /// distinguishes a consistency break (record without object) from a
    /// generic storage fault.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Unwrap or AEAD verification failure; security-relevant
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Metadata persistence failed after the upload succeeded; the
    /// compensating delete removed the uploaded object
    #[error("metadata write failed after upload (uploaded object was removed): {source}")]
    MetadataFailed {
        #[source]
        source: MetadataError,
    },

    /// Metadata persistence failed AND the compensating delete failed,
    /// leaving an orphaned ciphertext object in the store
    #[error("metadata write failed and cleanup of the uploaded object also failed: {metadata}; {cleanup}")]
    PartialFailure {
        metadata: MetadataError,
        cleanup: StoreError,
    },

    /// Metadata fault outside the upload compensation window
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
