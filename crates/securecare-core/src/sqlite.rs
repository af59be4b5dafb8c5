//! SQLite-backed record stores
//!
//! One connection shared behind a mutex; statements are short-lived and
//! never held across an await point. Foreign keys are enforced, so a
//! file record can only reference an existing patient.

use crate::error::{MetadataError, MetadataResult};
use crate::model::{
    AuditEntry, FileRecord, NewAuditEntry, NewFileRecord, NewPatient, NewUser, Patient, User,
};
use crate::store::{AuditSink, FileRecordStore, PatientDirectory, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name     TEXT,
    role          TEXT NOT NULL DEFAULT 'doctor',
    created_at    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS patients (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    age                 INTEGER,
    condition           TEXT,
    gender              TEXT,
    phone               TEXT,
    address             TEXT,
    emergency_contact   TEXT,
    medical_history     TEXT,
    allergies           TEXT,
    current_medications TEXT,
    created_at          TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS file_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id  INTEGER NOT NULL REFERENCES patients(id),
    object_key  TEXT NOT NULL,
    filename    TEXT NOT NULL,
    wrapped_key TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS audit_log (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id    TEXT,
    actor_role  TEXT,
    action      TEXT NOT NULL,
    target_type TEXT,
    target_id   TEXT,
    summary     TEXT,
    recorded_at TEXT NOT NULL
);
";

/// SQLite store implementing every record trait
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at the given path
    pub fn open(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let conn = Connection::open(path).map_err(map_sqlite_err)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> MetadataResult<Self> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> MetadataResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(map_sqlite_err)?;
        conn.execute_batch(SCHEMA).map_err(map_sqlite_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn map_sqlite_err(e: rusqlite::Error) -> MetadataError {
    match &e {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            MetadataError::Conflict(e.to_string())
        }
        _ => MetadataError::Unavailable(e.to_string()),
    }
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn file_record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        object_key: row.get(2)?,
        filename: row.get(3)?,
        wrapped_key: row.get(4)?,
        uploaded_at: timestamp_column(row, 5)?,
    })
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        condition: row.get(3)?,
        gender: row.get(4)?,
        phone: row.get(5)?,
        address: row.get(6)?,
        emergency_contact: row.get(7)?,
        medical_history: row.get(8)?,
        allergies: row.get(9)?,
        current_medications: row.get(10)?,
        created_at: timestamp_column(row, 11)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
    })
}

fn audit_from_row(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    Ok(AuditEntry {
        id: row.get(0)?,
        actor_id: row.get(1)?,
        actor_role: row.get(2)?,
        action: row.get(3)?,
        target_type: row.get(4)?,
        target_id: row.get(5)?,
        summary: row.get(6)?,
        recorded_at: timestamp_column(row, 7)?,
    })
}

#[async_trait]
impl FileRecordStore for SqliteStore {
    async fn insert(&self, new: NewFileRecord) -> MetadataResult<FileRecord> {
        let uploaded_at = Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO file_records (patient_id, object_key, filename, wrapped_key, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.patient_id,
                new.object_key,
                new.filename,
                new.wrapped_key,
                uploaded_at.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite_err)?;

        Ok(FileRecord {
            id: conn.last_insert_rowid(),
            patient_id: new.patient_id,
            filename: new.filename,
            object_key: new.object_key,
            wrapped_key: new.wrapped_key,
            uploaded_at,
        })
    }

    async fn get(&self, id: i64) -> MetadataResult<Option<FileRecord>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, patient_id, object_key, filename, wrapped_key, uploaded_at
                 FROM file_records WHERE id = ?1",
                params![id],
                file_record_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
    }

    async fn list_for_patient(&self, patient_id: i64) -> MetadataResult<Vec<FileRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, patient_id, object_key, filename, wrapped_key, uploaded_at
                 FROM file_records WHERE patient_id = ?1 ORDER BY id",
            )
            .map_err(map_sqlite_err)?;
        let rows = stmt
            .query_map(params![patient_id], file_record_from_row)
            .map_err(map_sqlite_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sqlite_err)
    }

    async fn delete(&self, id: i64) -> MetadataResult<bool> {
        let affected = self
            .conn
            .lock()
            .execute("DELETE FROM file_records WHERE id = ?1", params![id])
            .map_err(map_sqlite_err)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl PatientDirectory for SqliteStore {
    async fn create(&self, new: NewPatient) -> MetadataResult<Patient> {
        let created_at = Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO patients (name, age, condition, gender, phone, address,
                                   emergency_contact, medical_history, allergies,
                                   current_medications, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                new.name,
                new.age,
                new.condition,
                new.gender,
                new.phone,
                new.address,
                new.emergency_contact,
                new.medical_history,
                new.allergies,
                new.current_medications,
                created_at.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite_err)?;

        Ok(Patient {
            id: conn.last_insert_rowid(),
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
            created_at,
        })
    }

    async fn get(&self, id: i64) -> MetadataResult<Option<Patient>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, name, age, condition, gender, phone, address, emergency_contact,
                        medical_history, allergies, current_medications, created_at
                 FROM patients WHERE id = ?1",
                params![id],
                patient_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
    }

    async fn exists(&self, id: i64) -> MetadataResult<bool> {
        self.conn
            .lock()
            .query_row(
                "SELECT 1 FROM patients WHERE id = ?1",
                params![id],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(map_sqlite_err)
    }

    async fn list(&self) -> MetadataResult<Vec<Patient>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, age, condition, gender, phone, address, emergency_contact,
                        medical_history, allergies, current_medications, created_at
                 FROM patients ORDER BY id",
            )
            .map_err(map_sqlite_err)?;
        let rows = stmt.query_map([], patient_from_row).map_err(map_sqlite_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sqlite_err)
    }

    async fn update(&self, id: i64, changes: NewPatient) -> MetadataResult<Option<Patient>> {
        let conn = self.conn.lock();
        let existing = conn
            .query_row(
                "SELECT id, name, age, condition, gender, phone, address, emergency_contact,
                        medical_history, allergies, current_medications, created_at
                 FROM patients WHERE id = ?1",
                params![id],
                patient_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)?;

        let mut patient = match existing {
            Some(p) => p,
            None => return Ok(None),
        };
        patient.apply(changes);

        conn.execute(
            "UPDATE patients SET name = ?1, age = ?2, condition = ?3, gender = ?4, phone = ?5,
                                 address = ?6, emergency_contact = ?7, medical_history = ?8,
                                 allergies = ?9, current_medications = ?10
             WHERE id = ?11",
            params![
                patient.name,
                patient.age,
                patient.condition,
                patient.gender,
                patient.phone,
                patient.address,
                patient.emergency_contact,
                patient.medical_history,
                patient.allergies,
                patient.current_medications,
                id,
            ],
        )
        .map_err(map_sqlite_err)?;

        Ok(Some(patient))
    }

    async fn delete(&self, id: i64) -> MetadataResult<bool> {
        let affected = self
            .conn
            .lock()
            .execute("DELETE FROM patients WHERE id = ?1", params![id])
            .map_err(map_sqlite_err)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create(&self, new: NewUser) -> MetadataResult<User> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now();
        self.conn
            .lock()
            .execute(
                "INSERT INTO users (id, email, password_hash, full_name, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    new.email,
                    new.password_hash,
                    new.full_name,
                    new.role,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_err)?;

        Ok(User {
            id,
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            role: new.role,
            created_at,
        })
    }

    async fn find_by_email(&self, email: &str) -> MetadataResult<Option<User>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, email, password_hash, full_name, role, created_at
                 FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
    }

    async fn get(&self, id: &str) -> MetadataResult<Option<User>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, email, password_hash, full_name, role, created_at
                 FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
    }
}

#[async_trait]
impl AuditSink for SqliteStore {
    async fn record(&self, entry: NewAuditEntry) -> MetadataResult<AuditEntry> {
        let recorded_at = Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO audit_log (actor_id, actor_role, action, target_type, target_id,
                                    summary, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.actor_id,
                entry.actor_role,
                entry.action,
                entry.target_type,
                entry.target_id,
                entry.summary,
                recorded_at.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite_err)?;

        Ok(AuditEntry {
            id: conn.last_insert_rowid(),
            actor_id: entry.actor_id,
            actor_role: entry.actor_role,
            action: entry.action,
            target_type: entry.target_type,
            target_id: entry.target_id,
            summary: entry.summary,
            recorded_at,
        })
    }

    async fn list(&self, limit: i64, offset: i64) -> MetadataResult<Vec<AuditEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, actor_id, actor_role, action, target_type, target_id, summary,
                        recorded_at
                 FROM audit_log ORDER BY id LIMIT ?1 OFFSET ?2",
            )
            .map_err(map_sqlite_err)?;
        let rows = stmt
            .query_map(params![limit, offset], audit_from_row)
            .map_err(map_sqlite_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sqlite_err)
    }

    async fn get(&self, id: i64) -> MetadataResult<Option<AuditEntry>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, actor_id, actor_role, action, target_type, target_id, summary,
                        recorded_at
                 FROM audit_log WHERE id = ?1",
                params![id],
                audit_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
    }
}
