//! In-memory record stores for testing and development
//!
//! Same contract as the SQLite stores, nothing persists. Ids are
//! assigned from per-store counters so they behave like AUTOINCREMENT
//! columns.

use crate::error::{MetadataError, MetadataResult};
use crate::model::{
    AuditEntry, FileRecord, NewAuditEntry, NewFileRecord, NewPatient, NewUser, Patient, User,
};
use crate::store::{AuditSink, FileRecordStore, PatientDirectory, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// In-memory file record store
#[derive(Clone, Default)]
pub struct MemoryFileRecords {
    rows: Arc<DashMap<i64, FileRecord>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryFileRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl FileRecordStore for MemoryFileRecords {
    async fn insert(&self, new: NewFileRecord) -> MetadataResult<FileRecord> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = FileRecord {
            id,
            patient_id: new.patient_id,
            filename: new.filename,
            object_key: new.object_key,
            wrapped_key: new.wrapped_key,
            uploaded_at: Utc::now(),
        };
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> MetadataResult<Option<FileRecord>> {
        Ok(self.rows.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_for_patient(&self, patient_id: i64) -> MetadataResult<Vec<FileRecord>> {
        let mut records: Vec<FileRecord> = self
            .rows
            .iter()
            .filter(|entry| entry.value().patient_id == patient_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn delete(&self, id: i64) -> MetadataResult<bool> {
        Ok(self.rows.remove(&id).is_some())
    }
}

/// In-memory patient directory
#[derive(Clone, Default)]
pub struct MemoryPatients {
    rows: Arc<DashMap<i64, Patient>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryPatients {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientDirectory for MemoryPatients {
    async fn create(&self, new: NewPatient) -> MetadataResult<Patient> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let patient = Patient {
            id,
            name: new.name,
            age: new.age,
            condition: new.condition,
            gender: new.gender,
            phone: new.phone,
            address: new.address,
            emergency_contact: new.emergency_contact,
            medical_history: new.medical_history,
            allergies: new.allergies,
            current_medications: new.current_medications,
            created_at: Utc::now(),
        };
        self.rows.insert(id, patient.clone());
        Ok(patient)
    }

    async fn get(&self, id: i64) -> MetadataResult<Option<Patient>> {
        Ok(self.rows.get(&id).map(|entry| entry.value().clone()))
    }

    async fn exists(&self, id: i64) -> MetadataResult<bool> {
        Ok(self.rows.contains_key(&id))
    }

    async fn list(&self) -> MetadataResult<Vec<Patient>> {
        let mut patients: Vec<Patient> =
            self.rows.iter().map(|entry| entry.value().clone()).collect();
        patients.sort_by_key(|p| p.id);
        Ok(patients)
    }

    async fn update(&self, id: i64, changes: NewPatient) -> MetadataResult<Option<Patient>> {
        match self.rows.get_mut(&id) {
            Some(mut entry) => {
                entry.value_mut().apply(changes);
                Ok(Some(entry.value().clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> MetadataResult<bool> {
        Ok(self.rows.remove(&id).is_some())
    }
}

/// In-memory user store
#[derive(Clone, Default)]
pub struct MemoryUsers {
    rows: Arc<DashMap<String, User>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn create(&self, new: NewUser) -> MetadataResult<User> {
        if self
            .rows
            .iter()
            .any(|entry| entry.value().email == new.email)
        {
            return Err(MetadataError::Conflict(format!(
                "email already registered: {}",
                new.email
            )));
        }
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            role: new.role,
            created_at: Utc::now(),
        };
        self.rows.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> MetadataResult<Option<User>> {
        Ok(self
            .rows
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn get(&self, id: &str) -> MetadataResult<Option<User>> {
        Ok(self.rows.get(id).map(|entry| entry.value().clone()))
    }
}

/// In-memory audit trail
#[derive(Clone, Default)]
pub struct MemoryAudit {
    rows: Arc<DashMap<i64, AuditEntry>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditSink for MemoryAudit {
    async fn record(&self, entry: NewAuditEntry) -> MetadataResult<AuditEntry> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = AuditEntry {
            id,
            actor_id: entry.actor_id,
            actor_role: entry.actor_role,
            action: entry.action,
            target_type: entry.target_type,
            target_id: entry.target_id,
            summary: entry.summary,
            recorded_at: Utc::now(),
        };
        self.rows.insert(id, entry.clone());
        Ok(entry)
    }

    async fn list(&self, limit: i64, offset: i64) -> MetadataResult<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> =
            self.rows.iter().map(|entry| entry.value().clone()).collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get(&self, id: i64) -> MetadataResult<Option<AuditEntry>> {
        Ok(self.rows.get(&id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patient(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            age: Some(44),
            condition: Some("hypertension".to_string()),
            gender: None,
            phone: None,
            address: None,
            emergency_contact: None,
            medical_history: None,
            allergies: None,
            current_medications: None,
        }
    }

    #[tokio::test]
    async fn test_file_records_crud() {
        let store = MemoryFileRecords::new();

        let record = store
            .insert(NewFileRecord {
                patient_id: 1,
                object_key: "patients/1/abc-note.txt".to_string(),
                filename: "note.txt".to_string(),
                wrapped_key: "token".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(record.id, 1);
        assert!(store.get(record.id).await.unwrap().is_some());
        assert_eq!(store.list_for_patient(1).await.unwrap().len(), 1);
        assert!(store.list_for_patient(2).await.unwrap().is_empty());

        assert!(store.delete(record.id).await.unwrap());
        assert!(!store.delete(record.id).await.unwrap());
        assert!(store.get(record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_patient_update_keeps_unset_fields() {
        let store = MemoryPatients::new();
        let created = store.create(sample_patient("Asha Raman")).await.unwrap();

        let mut changes = sample_patient("Asha Raman");
        changes.age = None;
        changes.condition = None;
        changes.phone = Some("555-0199".to_string());

        let updated = store.update(created.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.age, Some(44));
        assert_eq!(updated.condition.as_deref(), Some("hypertension"));
        assert_eq!(updated.phone.as_deref(), Some("555-0199"));
    }

    #[tokio::test]
    async fn test_patient_exists() {
        let store = MemoryPatients::new();
        let created = store.create(sample_patient("Lee")).await.unwrap();

        assert!(store.exists(created.id).await.unwrap());
        assert!(!store.exists(created.id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUsers::new();
        let new_user = |email: &str| NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
            role: "doctor".to_string(),
        };

        store.create(new_user("dr@clinic.test")).await.unwrap();
        let result = store.create(new_user("dr@clinic.test")).await;
        assert!(matches!(result, Err(MetadataError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_audit_list_pagination() {
        let sink = MemoryAudit::new();
        for i in 0..5 {
            sink.record(NewAuditEntry {
                actor_id: None,
                actor_role: None,
                action: format!("action-{}", i),
                target_type: None,
                target_id: None,
                summary: None,
            })
            .await
            .unwrap();
        }

        let page = sink.list(2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].action, "action-1");
        assert_eq!(page[1].action, "action-2");
    }
}
