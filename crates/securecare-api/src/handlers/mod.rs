//! HTTP request handlers

pub mod audit;
pub mod auth;
pub mod files;
pub mod patients;

use crate::state::{AppState, CurrentUser};
use axum::Json;
use securecare_core::NewAuditEntry;
use serde_json::{json, Value};

/// GET / - service banner
pub async fn index() -> Json<Value> {
    Json(json!({
        "ok": true,
        "project": "SecureCare API",
    }))
}

/// Record an action in the audit trail, fire-and-forget: a failing
/// audit write is logged and never fails the request that caused it.
pub(crate) async fn record_audit(
    state: &AppState,
    user: &CurrentUser,
    action: &str,
    target_type: &str,
    target_id: i64,
    summary: Option<String>,
) {
    let entry = NewAuditEntry {
        actor_id: Some(user.id.clone()),
        actor_role: Some(user.role.clone()),
        action: action.to_string(),
        target_type: Some(target_type.to_string()),
        target_id: Some(target_id.to_string()),
        summary,
    };
    if let Err(e) = state.audit.record(entry).await {
        tracing::warn!(error = %e, action, "audit record failed");
    }
}
