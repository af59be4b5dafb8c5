//! Encrypted file handlers
//!
//! Download and view share the vault's single decrypt path; they differ
//! only in response framing (attachment vs inline + guessed media type).

use crate::handlers::record_audit;
use crate::state::CurrentUser;
use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::{Extension, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use securecare_core::{FileRecord, RetrievedFile};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// POST /files/upload - encrypt and store a document
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut patient_id: Option<i64> = None;
    let mut upload: Option<(String, Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("patient_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable patient_id: {}", e)))?;
                patient_id = Some(text.trim().parse().map_err(|_| {
                    ApiError::BadRequest("patient_id must be an integer".to_string())
                })?);
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ApiError::BadRequest("File field has no filename".to_string()))?;
                let declared = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable file field: {}", e)))?;
                upload = Some((filename, declared, data));
            }
            _ => {}
        }
    }

    let patient_id =
        patient_id.ok_or_else(|| ApiError::BadRequest("Missing patient_id field".to_string()))?;
    let (filename, declared, data) =
        upload.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
    let content_type = declared
        .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream().to_string());

    let record = state
        .vault
        .ingest(patient_id, &filename, &content_type, &data)
        .await?;

    record_audit(
        &state,
        &user,
        "file.upload",
        "file",
        record.id,
        Some(format!("uploaded {}", record.filename)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /files/{id}/download - decrypt and return as attachment
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(file_id): Path<i64>,
) -> Result<Response, ApiError> {
    let file = state.vault.retrieve(file_id).await?;
    record_audit(&state, &user, "file.download", "file", file_id, None).await;
    plaintext_response(file, false)
}

/// GET /files/{id}/view - decrypt and return inline for previewing
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(file_id): Path<i64>,
) -> Result<Response, ApiError> {
    let file = state.vault.retrieve(file_id).await?;
    record_audit(&state, &user, "file.view", "file", file_id, None).await;
    plaintext_response(file, true)
}

fn plaintext_response(file: RetrievedFile, inline: bool) -> Result<Response, ApiError> {
    let media_type = if inline {
        mime_guess::from_path(&file.filename)
            .first_or_octet_stream()
            .to_string()
    } else {
        "application/octet-stream".to_string()
    };
    let disposition = format!(
        "{}; filename=\"{}\"",
        if inline { "inline" } else { "attachment" },
        file.filename
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(file.bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// GET /files/patient/{patient_id} - list a patient's file records
pub async fn list_patient_files(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<FileRecord>>, ApiError> {
    if !state.patients.exists(patient_id).await? {
        return Err(ApiError::NotFound("Patient not found".to_string()));
    }
    Ok(Json(state.files.list_for_patient(patient_id).await?))
}

/// DELETE /files/{id} - remove the object and its metadata
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(file_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.vault.remove(file_id).await?;
    record_audit(&state, &user, "file.delete", "file", file_id, None).await;
    Ok(Json(json!({ "ok": true, "message": "File deleted" })))
}

/// GET /files/{id}/presigned - presigned URL for the encrypted object
pub async fn presigned_url(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let url = state
        .vault
        .presigned_url(file_id, Duration::from_secs(state.config.presign_ttl_secs))
        .await?;
    Ok(Json(json!({ "url": url })))
}
