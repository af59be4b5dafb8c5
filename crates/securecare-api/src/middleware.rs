//! HTTP middleware

use crate::auth::{extract_bearer_token, validate_token};
use crate::state::CurrentUser;
use crate::{ApiError, AppState};
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;

/// Authentication middleware.
///
/// Validates the bearer token, loads the account it names, and inserts
/// a [`CurrentUser`] extension for the handlers. Applied to every route
/// except `/` and `/auth/*`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))?;

    let claims = validate_token(token, &state.config.jwt_secret)?;

    let user = state
        .users
        .get(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
        full_name: user.full_name,
    });

    Ok(next.run(request).await)
}
