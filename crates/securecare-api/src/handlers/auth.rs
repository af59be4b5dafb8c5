//! Signup and login handlers
//!
//! Credentials travel in JSON bodies; tokens are HS256 JWTs carrying
//! the user id and role.

use crate::auth::{create_access_token, hash_password, verify_password};
use crate::{ApiError, AppState};
use axum::{extract::State, Json};
use securecare_core::NewUser;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

fn default_role() -> String {
    "doctor".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create(NewUser {
            email: payload.email,
            password_hash,
            full_name: payload.full_name,
            role: payload.role,
        })
        .await?;

    Ok(Json(json!({
        "message": "User created successfully",
        "user_id": user.id,
    })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = match state.users.find_by_email(&payload.email).await? {
        Some(user) if verify_password(&payload.password, &user.password_hash) => user,
        // One message for both cases: don't reveal which field was wrong.
        _ => return Err(ApiError::Unauthorized("Incorrect email or password".to_string())),
    };

    let token = create_access_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours)?;

    Ok(Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": {
            "id": user.id,
            "email": user.email,
            "role": user.role,
            "full_name": user.full_name,
        },
    })))
}
