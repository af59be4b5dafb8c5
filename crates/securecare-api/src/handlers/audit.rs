//! Audit trail handlers (admin only)

use crate::state::CurrentUser;
use crate::{ApiError, AppState};
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use securecare_core::AuditEntry;
use serde::Deserialize;
use std::sync::Arc;

fn default_limit() -> i64 {
    200
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn require_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin privileges required".to_string()))
    }
}

/// GET /audit - list audit entries
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    require_admin(&user)?;
    Ok(Json(state.audit.list(query.limit, query.offset).await?))
}

/// GET /audit/{id} - single audit entry
pub async fn get_audit_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(log_id): Path<i64>,
) -> Result<Json<AuditEntry>, ApiError> {
    require_admin(&user)?;
    state
        .audit
        .get(log_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Audit log not found".to_string()))
}
