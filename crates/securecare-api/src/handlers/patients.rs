//! Patient directory handlers

use crate::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use securecare_core::{NewPatient, Patient};
use std::sync::Arc;

/// POST /patients - register a patient
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewPatient>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.patients.create(payload).await?))
}

/// GET /patients - list patients
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.patients.list().await?))
}

/// GET /patients/{id} - patient details
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    state
        .patients
        .get(patient_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Patient not found".to_string()))
}

/// PUT /patients/{id} - update a patient
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<i64>,
    Json(payload): Json<NewPatient>,
) -> Result<Json<Patient>, ApiError> {
    state
        .patients
        .update(patient_id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Patient not found".to_string()))
}

/// DELETE /patients/{id}
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.patients.delete(patient_id).await? {
        return Err(ApiError::NotFound("Patient not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
