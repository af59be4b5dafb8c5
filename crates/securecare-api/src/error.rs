//! API error type and HTTP mapping
//!
//! Responses carry FastAPI-style `{"detail": ...}` JSON bodies. Detail
//! strings stay operational: no plaintext, key material, or wrapped
//! token contents ever appear in them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use securecare_core::{MetadataError, VaultError};
use securecare_crypto::CryptoError;
use securecare_store::StoreError;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Resolve the HTTP status and the client-facing detail string.
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Vault(vault) => match vault {
                VaultError::EmptyUpload => {
                    (StatusCode::BAD_REQUEST, "Empty file".to_string())
                }
                VaultError::RecordNotFound(_) => {
                    (StatusCode::NOT_FOUND, "File not found".to_string())
                }
                VaultError::Storage(StoreError::NotFound(_)) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File content is missing from storage".to_string(),
                ),
                VaultError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage operation failed".to_string(),
                ),
                VaultError::Crypto(CryptoError::Configuration(_)) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service is misconfigured".to_string(),
                ),
                VaultError::Crypto(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Decryption failed".to_string(),
                ),
                VaultError::MetadataFailed { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed saving metadata".to_string(),
                ),
                VaultError::PartialFailure { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed saving metadata; uploaded object could not be removed".to_string(),
                ),
                VaultError::Metadata(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Metadata operation failed".to_string(),
                ),
            },
            Self::Metadata(MetadataError::Conflict(msg)) => (StatusCode::CONFLICT, msg.clone()),
            Self::Metadata(MetadataError::Unavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Metadata operation failed".to_string(),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), error = %self, "request failed");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_error_status_mapping() {
        let cases = [
            (ApiError::Vault(VaultError::EmptyUpload), StatusCode::BAD_REQUEST),
            (
                ApiError::Vault(VaultError::RecordNotFound(7)),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Vault(VaultError::Storage(StoreError::Unavailable("x".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Vault(VaultError::Crypto(CryptoError::Integrity)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Vault(VaultError::PartialFailure {
                    metadata: MetadataError::Unavailable("db".into()),
                    cleanup: StoreError::Unavailable("s3".into()),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("no".into()), StatusCode::FORBIDDEN),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_and_detail().0, expected);
        }
    }

    #[test]
    fn test_missing_object_is_distinguishable_from_generic_fault() {
        let missing = ApiError::Vault(VaultError::Storage(StoreError::NotFound("k".into())));
        let generic = ApiError::Vault(VaultError::Storage(StoreError::Unavailable("x".into())));

        assert_ne!(
            missing.status_and_detail().1,
            generic.status_and_detail().1
        );
    }

    #[test]
    fn test_crypto_detail_does_not_echo_error_internals() {
        let error = ApiError::Vault(VaultError::Crypto(CryptoError::InvalidWrappedKey));
        let (status, detail) = error.status_and_detail();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail, "Decryption failed");
    }
}
