//! # SecureCare API
//!
//! HTTP service for the SecureCare patient document store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │              (frontend, curl, tests)                │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  SecureCare API                     │
//! ├─────────────────────────────────────────────────────┤
//! │   Auth Middleware │ CORS │ Request Tracing          │
//! ├─────────────────────────────────────────────────────┤
//! │   Handlers (auth, patients, files, audit)           │
//! ├─────────────────────────────────────────────────────┤
//! │                 securecare-core                     │
//! │       (FileVault, record stores, models)            │
//! ├─────────────────────────────────────────────────────┤
//! │   securecare-crypto      │   securecare-store       │
//! │   (AES-GCM, key wrap)    │   (S3-compatible blobs)  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use server::run_server;
pub use state::AppState;
