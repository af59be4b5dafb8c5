//! Record store trait boundaries
//!
//! The vault and the HTTP handlers only ever see these traits; whether
//! rows live in SQLite or in memory is a startup decision.

use crate::error::MetadataResult;
use crate::model::{
    AuditEntry, FileRecord, NewAuditEntry, NewFileRecord, NewPatient, NewUser, Patient, User,
};
use async_trait::async_trait;

/// Persistence for encrypted-file metadata rows
#[async_trait]
pub trait FileRecordStore: Send + Sync {
    /// Persist a new record, assigning its id
    async fn insert(&self, new: NewFileRecord) -> MetadataResult<FileRecord>;

    /// Fetch a record by id
    async fn get(&self, id: i64) -> MetadataResult<Option<FileRecord>>;

    /// List records belonging to a patient, oldest first
    async fn list_for_patient(&self, patient_id: i64) -> MetadataResult<Vec<FileRecord>>;

    /// Delete a record; returns whether a row existed
    async fn delete(&self, id: i64) -> MetadataResult<bool>;
}

/// The patient directory. The vault only needs `exists`; the CRUD
/// surface serves the patient routes.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn create(&self, new: NewPatient) -> MetadataResult<Patient>;

    async fn get(&self, id: i64) -> MetadataResult<Option<Patient>>;

    /// Boolean existence check used before listing a patient's files
    async fn exists(&self, id: i64) -> MetadataResult<bool>;

    async fn list(&self) -> MetadataResult<Vec<Patient>>;

    /// Apply non-empty fields over the stored row; `None` fields are
    /// left untouched
    async fn update(&self, id: i64, changes: NewPatient) -> MetadataResult<Option<Patient>>;

    async fn delete(&self, id: i64) -> MetadataResult<bool>;
}

/// Account storage for the identity layer
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account; fails with a conflict when the email is taken
    async fn create(&self, new: NewUser) -> MetadataResult<User>;

    async fn find_by_email(&self, email: &str) -> MetadataResult<Option<User>>;

    async fn get(&self, id: &str) -> MetadataResult<Option<User>>;
}

/// Fire-and-forget audit trail. Callers log and swallow `record`
/// failures; an audit fault never fails the request that caused it.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: NewAuditEntry) -> MetadataResult<AuditEntry>;

    async fn list(&self, limit: i64, offset: i64) -> MetadataResult<Vec<AuditEntry>>;

    async fn get(&self, id: i64) -> MetadataResult<Option<AuditEntry>>;
}
