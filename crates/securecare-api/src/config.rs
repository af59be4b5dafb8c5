//! Service configuration
//!
//! All secrets are read once at startup into this immutable value and
//! passed by reference from then on; nothing reads ambient state during
//! request handling.

use serde::{Deserialize, Serialize};

/// API server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// SQLite database path (ignored with `use_memory_store`)
    pub database_path: String,
    /// Use in-memory stores (for testing/development)
    pub use_memory_store: bool,
    /// Bucket holding the encrypted objects
    pub bucket: String,
    /// S3-compatible endpoint override (e.g. a Backblaze B2 endpoint)
    pub s3_endpoint: Option<String>,
    /// S3 region name
    pub s3_region: String,
    pub s3_access_key_id: String,
    pub s3_secret_access_key: String,
    /// Base64 master secret wrapping every file key; startup-fatal when
    /// missing or malformed
    pub master_key: String,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Access token lifetime (hours)
    pub token_ttl_hours: i64,
    /// Presigned download URL lifetime (seconds)
    pub presign_ttl_secs: u64,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// CORS allowed origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_path: "securecare.db".to_string(),
            use_memory_store: false,
            bucket: String::new(),
            s3_endpoint: None,
            s3_region: "us-east-1".to_string(),
            s3_access_key_id: String::new(),
            s3_secret_access_key: String::new(),
            master_key: String::new(),
            jwt_secret: "dev_secret_change_me".to_string(),
            token_ttl_hours: 24,
            presign_ttl_secs: 3600,
            max_body_size: 50 * 1024 * 1024, // 50 MB
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ApiConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
