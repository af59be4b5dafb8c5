//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state);

    // Everything except the banner and the auth endpoints requires an
    // authenticated caller.
    let protected = Router::new()
        .route(
            "/patients",
            post(handlers::patients::create_patient).get(handlers::patients::list_patients),
        )
        .route(
            "/patients/{id}",
            get(handlers::patients::get_patient)
                .put(handlers::patients::update_patient)
                .delete(handlers::patients::delete_patient),
        )
        .route("/files/upload", post(handlers::files::upload_file))
        .route("/files/{id}/download", get(handlers::files::download_file))
        .route("/files/{id}/view", get(handlers::files::view_file))
        .route("/files/{id}/presigned", get(handlers::files::presigned_url))
        .route("/files/{id}", delete(handlers::files::delete_file))
        .route(
            "/files/patient/{patient_id}",
            get(handlers::files::list_patient_files),
        )
        .route("/audit", get(handlers::audit::list_audit_logs))
        .route("/audit/{id}", get(handlers::audit::get_audit_log))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
