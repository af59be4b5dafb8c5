//! Application state
//!
//! Everything the handlers share is built exactly once here: the master
//! key, the object-store client, the record stores, and the vault that
//! ties them together. Request handling never constructs clients or
//! reads configuration on its own.

use crate::config::ApiConfig;
use anyhow::Context;
use securecare_core::{
    AuditSink, FileRecordStore, FileVault, MemoryAudit, MemoryFileRecords, MemoryPatients,
    MemoryUsers, PatientDirectory, SqliteStore, UserStore,
};
use securecare_crypto::MasterKey;
use securecare_store::{MemoryObjectStore, ObjectStore, S3Config, S3ObjectStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// Service configuration
    pub config: ApiConfig,
    /// Encrypted file workflows
    pub vault: FileVault,
    /// File metadata rows (listing; the vault holds its own handle)
    pub files: Arc<dyn FileRecordStore>,
    /// Patient directory
    pub patients: Arc<dyn PatientDirectory>,
    /// Caller accounts
    pub users: Arc<dyn UserStore>,
    /// Audit trail
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Fails fast on a missing or malformed master key: wrapping with a
    /// broken configuration must never get as far as a request.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let master =
            MasterKey::from_base64(&config.master_key).context("master key configuration")?;

        let objects: Arc<dyn ObjectStore> = if config.use_memory_store {
            warn!("⚠ Using in-memory object store (data will NOT persist)");
            Arc::new(MemoryObjectStore::new())
        } else {
            info!(
                bucket = %config.bucket,
                endpoint = config.s3_endpoint.as_deref().unwrap_or("aws"),
                "Using S3-compatible object store"
            );
            Arc::new(S3ObjectStore::new(S3Config {
                bucket: config.bucket.clone(),
                region: config.s3_region.clone(),
                endpoint: config.s3_endpoint.clone(),
                access_key_id: config.s3_access_key_id.clone(),
                secret_access_key: config.s3_secret_access_key.clone(),
            }))
        };

        let (files, patients, users, audit) = if config.use_memory_store {
            warn!("⚠ Using in-memory record stores (data will NOT persist)");
            (
                Arc::new(MemoryFileRecords::new()) as Arc<dyn FileRecordStore>,
                Arc::new(MemoryPatients::new()) as Arc<dyn PatientDirectory>,
                Arc::new(MemoryUsers::new()) as Arc<dyn UserStore>,
                Arc::new(MemoryAudit::new()) as Arc<dyn AuditSink>,
            )
        } else {
            let store = Arc::new(
                SqliteStore::open(&config.database_path)
                    .with_context(|| format!("opening database at {}", config.database_path))?,
            );
            info!(path = %config.database_path, "Opened SQLite metadata store");
            (
                store.clone() as Arc<dyn FileRecordStore>,
                store.clone() as Arc<dyn PatientDirectory>,
                store.clone() as Arc<dyn UserStore>,
                store as Arc<dyn AuditSink>,
            )
        };

        let vault = FileVault::new(Arc::clone(&objects), Arc::clone(&files), master);

        Ok(Self {
            config,
            vault,
            files,
            patients,
            users,
            audit,
        })
    }
}

/// The authenticated caller, inserted by the auth middleware
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub full_name: Option<String>,
}

impl CurrentUser {
    /// Check for the admin role
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
