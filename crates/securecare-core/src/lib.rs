//! # SecureCare Core
//!
//! Core engine for the SecureCare document store.
//!
//! This crate provides:
//! - **Domain models**: file records, patients, users, audit entries
//! - **Record stores**: async trait boundaries with in-memory and
//!   SQLite implementations
//! - **FileVault**: the encrypted ingest / retrieval / deletion
//!   workflows, including compensation when a step fails mid-flight
//!
//! ## Consistency
//!
//! The goal is that a file record exists exactly when its encrypted
//! object does. Ingest compensates a metadata failure by deleting the
//! just-uploaded object; deletion removes the object first and the
//! record second, so a failure between the two leaves a dangling record
//! rather than an unreachable object.

pub mod error;
pub mod memory;
pub mod model;
pub mod sqlite;
pub mod store;
pub mod vault;

pub use error::{MetadataError, MetadataResult, VaultError, VaultResult};
pub use memory::{MemoryAudit, MemoryFileRecords, MemoryPatients, MemoryUsers};
pub use model::{
    AuditEntry, FileRecord, NewAuditEntry, NewFileRecord, NewPatient, NewUser, Patient, User,
};
pub use sqlite::SqliteStore;
pub use store::{AuditSink, FileRecordStore, PatientDirectory, UserStore};
pub use vault::{FileVault, RetrievedFile};
