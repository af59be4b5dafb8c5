//! Domain models
//!
//! Shapes mirror the persisted rows. `FileRecord::wrapped_key` never
//! serializes: the wrapped DEK stays server-side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable metadata row for one encrypted file
#[derive(Clone, Debug, Serialize)]
pub struct FileRecord {
    pub id: i64,
    pub patient_id: i64,
    pub filename: String,
    pub object_key: String,
    #[serde(skip_serializing)]
    pub wrapped_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Fields for a file record about to be persisted
#[derive(Clone, Debug)]
pub struct NewFileRecord {
    pub patient_id: i64,
    pub object_key: String,
    pub filename: String,
    pub wrapped_key: String,
}

/// A patient in the directory
#[derive(Clone, Debug, Serialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub condition: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Overlay update fields: the name always wins, optional fields
    /// only when provided.
    pub fn apply(&mut self, changes: NewPatient) {
        self.name = changes.name;
        if changes.age.is_some() {
            self.age = changes.age;
        }
        if changes.condition.is_some() {
            self.condition = changes.condition;
        }
        if changes.gender.is_some() {
            self.gender = changes.gender;
        }
        if changes.phone.is_some() {
            self.phone = changes.phone;
        }
        if changes.address.is_some() {
            self.address = changes.address;
        }
        if changes.emergency_contact.is_some() {
            self.emergency_contact = changes.emergency_contact;
        }
        if changes.medical_history.is_some() {
            self.medical_history = changes.medical_history;
        }
        if changes.allergies.is_some() {
            self.allergies = changes.allergies;
        }
        if changes.current_medications.is_some() {
            self.current_medications = changes.current_medications;
        }
    }
}

/// Patient fields accepted on create and update
#[derive(Clone, Debug, Deserialize)]
pub struct NewPatient {
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub current_medications: Option<String>,
}

/// An authenticated caller account
#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a user about to be created
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: String,
}

/// One recorded action in the audit trail
#[derive(Clone, Debug, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub actor_id: Option<String>,
    pub actor_role: Option<String>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub summary: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Fields for an audit entry about to be recorded
#[derive(Clone, Debug)]
pub struct NewAuditEntry {
    pub actor_id: Option<String>,
    pub actor_role: Option<String>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub summary: Option<String>,
}
