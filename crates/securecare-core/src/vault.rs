//! Encrypted file workflows
//!
//! `FileVault` owns the full upload/download/delete lifecycle:
//!
//! - **Ingest**: validate → generate DEK → encrypt → wrap DEK → upload
//!   → persist metadata, with a compensating object delete when the
//!   metadata write fails after a successful upload.
//! - **Retrieve**: record lookup → blob fetch → unwrap → decrypt. The
//!   download/view presentation variants share this single path and
//!   differ only in HTTP framing.
//! - **Remove**: object delete first, then the metadata row.
//!
//! Every external call is attempted exactly once per step; a failure
//! aborts the remaining steps. The DEK goes out of scope (and is
//! zeroized) at the end of each workflow no matter how it ended.

use crate::error::{VaultError, VaultResult};
use crate::model::{FileRecord, NewFileRecord};
use crate::store::FileRecordStore;
use bytes::Bytes;
use securecare_crypto::{cipher, FileKey, MasterKey, WrappedKey};
use securecare_store::{ObjectStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Plaintext recovered by the retrieval workflow
pub struct RetrievedFile {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// The encrypted-file service
pub struct FileVault {
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn FileRecordStore>,
    master: MasterKey,
}

impl FileVault {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn FileRecordStore>,
        master: MasterKey,
    ) -> Self {
        Self {
            objects,
            records,
            master,
        }
    }

    /// Build the durable object key: `patients/{id}/{uuid}-{filename}`.
    /// The random UUID makes concurrent ingests conflict-free.
    fn object_key(patient_id: i64, filename: &str) -> String {
        format!("patients/{}/{}-{}", patient_id, Uuid::new_v4(), filename)
    }

    /// Encrypt and store a file, returning its persisted record.
    pub async fn ingest(
        &self,
        patient_id: i64,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> VaultResult<FileRecord> {
        // Reject before any key material exists.
        if data.is_empty() {
            return Err(VaultError::EmptyUpload);
        }

        let dek = FileKey::generate();
        let sealed = cipher::encrypt(data, &dek)?;
        // A wrapping failure aborts here: nothing has been uploaded.
        let wrapped = self.master.wrap(&dek)?;

        let object_key = Self::object_key(patient_id, filename);
        self.objects
            .put(&object_key, Bytes::from(sealed), content_type)
            .await?;

        match self
            .records
            .insert(NewFileRecord {
                patient_id,
                object_key: object_key.clone(),
                filename: filename.to_string(),
                wrapped_key: wrapped.as_str().to_string(),
            })
            .await
        {
            Ok(record) => {
                info!(file_id = record.id, patient_id, "file ingested");
                Ok(record)
            }
            Err(metadata) => {
                warn!(
                    %object_key,
                    error = %metadata,
                    "metadata write failed after upload, removing orphaned object"
                );
                match self.objects.delete(&object_key).await {
                    Ok(()) => Err(VaultError::MetadataFailed { source: metadata }),
                    Err(cleanup) => {
                        error!(
                            %object_key,
                            error = %cleanup,
                            "compensating delete failed, ciphertext object is orphaned"
                        );
                        Err(VaultError::PartialFailure { metadata, cleanup })
                    }
                }
            }
        }
    }

    /// Fetch and decrypt a stored file.
    pub async fn retrieve(&self, file_id: i64) -> VaultResult<RetrievedFile> {
        let record = self
            .records
            .get(file_id)
            .await?
            .ok_or(VaultError::RecordNotFound(file_id))?;

        let sealed = self.objects.get(&record.object_key).await.map_err(|e| {
            if matches!(e, StoreError::NotFound(_)) {
                error!(
                    file_id,
                    object_key = %record.object_key,
                    "metadata row exists but object is missing"
                );
            }
            VaultError::Storage(e)
        })?;

        let dek = self
            .master
            .unwrap(&WrappedKey::from_token(record.wrapped_key))
            .map_err(|e| {
                warn!(target: "security", file_id, "stored wrapped key failed to unwrap");
                VaultError::Crypto(e)
            })?;

        let plaintext = cipher::decrypt(&sealed, &dek).map_err(|e| {
            warn!(target: "security", file_id, "stored ciphertext failed verification");
            VaultError::Crypto(e)
        })?;

        Ok(RetrievedFile {
            bytes: plaintext,
            filename: record.filename,
        })
    }

    /// Delete a stored file: the object first, then the metadata row.
    ///
    /// A record-delete failure after the object is gone leaves a
    /// dangling metadata row; retrieval of that id then reports the
    /// missing object as a storage fault.
    pub async fn remove(&self, file_id: i64) -> VaultResult<()> {
        let record = self
            .records
            .get(file_id)
            .await?
            .ok_or(VaultError::RecordNotFound(file_id))?;

        self.objects.delete(&record.object_key).await?;
        self.records.delete(file_id).await?;

        info!(file_id, patient_id = record.patient_id, "file removed");
        Ok(())
    }

    /// Presigned GET URL for the encrypted object; no crypto involved.
    pub async fn presigned_url(&self, file_id: i64, ttl: Duration) -> VaultResult<String> {
        let record = self
            .records
            .get(file_id)
            .await?
            .ok_or(VaultError::RecordNotFound(file_id))?;

        Ok(self
            .objects
            .presigned_get_url(&record.object_key, ttl)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use crate::memory::MemoryFileRecords;
    use async_trait::async_trait;
    use securecare_crypto::{CryptoError, BLOB_OVERHEAD};
    use securecare_store::MemoryObjectStore;

    const PAYLOAD: &[u8] = b"Hello SecureCare - test payload";

    fn vault_with(objects: Arc<dyn ObjectStore>, records: Arc<dyn FileRecordStore>) -> FileVault {
        FileVault::new(objects, records, MasterKey::generate())
    }

    /// Record store whose inserts always fail.
    struct BrokenRecords;

    #[async_trait]
    impl FileRecordStore for BrokenRecords {
        async fn insert(&self, _new: NewFileRecord) -> Result<FileRecord, MetadataError> {
            Err(MetadataError::Unavailable("database is down".to_string()))
        }
        async fn get(&self, _id: i64) -> Result<Option<FileRecord>, MetadataError> {
            Ok(None)
        }
        async fn list_for_patient(&self, _patient_id: i64) -> Result<Vec<FileRecord>, MetadataError> {
            Ok(vec![])
        }
        async fn delete(&self, _id: i64) -> Result<bool, MetadataError> {
            Ok(false)
        }
    }

    /// Object store wrapper that refuses deletes.
    struct NoDeleteStore {
        inner: MemoryObjectStore,
    }

    #[async_trait]
    impl ObjectStore for NoDeleteStore {
        async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StoreError> {
            self.inner.put(key, data, content_type).await
        }
        async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
            self.inner.get(key).await
        }
        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("delete rejected".to_string()))
        }
        async fn presigned_get_url(
            &self,
            key: &str,
            ttl: Duration,
        ) -> Result<String, StoreError> {
            self.inner.presigned_get_url(key, ttl).await
        }
    }

    /// Object store whose puts always fail.
    struct NoPutStore;

    #[async_trait]
    impl ObjectStore for NoPutStore {
        async fn put(&self, _key: &str, _data: Bytes, _ct: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("endpoint unreachable".to_string()))
        }
        async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
            Err(StoreError::NotFound(key.to_string()))
        }
        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
        async fn presigned_get_url(&self, _key: &str, _ttl: Duration) -> Result<String, StoreError> {
            Err(StoreError::Unavailable("endpoint unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_ingest_then_retrieve_roundtrip() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records.clone());

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        assert_eq!(record.patient_id, 1);
        assert_eq!(record.filename, "note.txt");
        assert!(record.object_key.starts_with("patients/1/"));
        assert!(record.object_key.ends_with("-note.txt"));

        let retrieved = vault.retrieve(record.id).await.unwrap();
        assert_eq!(retrieved.bytes, PAYLOAD);
        assert_eq!(retrieved.filename, "note.txt");
    }

    #[tokio::test]
    async fn test_stored_object_is_ciphertext() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records);

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        let stored = objects.get(&record.object_key).await.unwrap();
        assert_eq!(stored.len(), PAYLOAD.len() + BLOB_OVERHEAD);
        assert!(!stored
            .windows(PAYLOAD.len())
            .any(|window| window == PAYLOAD));
    }

    #[tokio::test]
    async fn test_ingest_rejects_empty_upload() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records.clone());

        let result = vault.ingest(1, "empty.bin", "application/octet-stream", b"").await;

        assert!(matches!(result, Err(VaultError::EmptyUpload)));
        assert!(objects.is_empty());
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_keys_are_unique_per_upload() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects, records);

        let a = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();
        let b = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        assert_ne!(a.object_key, b.object_key);
        assert_ne!(a.wrapped_key, b.wrapped_key);
    }

    #[tokio::test]
    async fn test_upload_failure_is_plain_storage_error() {
        let vault = vault_with(Arc::new(NoPutStore), Arc::new(MemoryFileRecords::new()));

        let result = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await;

        assert!(matches!(
            result,
            Err(VaultError::Storage(StoreError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_compensation_removes_uploaded_object() {
        let objects = Arc::new(MemoryObjectStore::new());
        let vault = vault_with(objects.clone(), Arc::new(BrokenRecords));

        let result = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await;

        // Distinct from a plain upload failure, and the orphan is gone.
        assert!(matches!(result, Err(VaultError::MetadataFailed { .. })));
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn test_failed_compensation_surfaces_partial_failure() {
        let objects = Arc::new(NoDeleteStore {
            inner: MemoryObjectStore::new(),
        });
        let vault = vault_with(objects.clone(), Arc::new(BrokenRecords));

        let result = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await;

        assert!(matches!(result, Err(VaultError::PartialFailure { .. })));
        // The orphaned ciphertext object is still there.
        assert_eq!(objects.inner.len(), 1);
    }

    #[tokio::test]
    async fn test_retrieve_missing_record() {
        let vault = vault_with(
            Arc::new(MemoryObjectStore::new()),
            Arc::new(MemoryFileRecords::new()),
        );

        let result = vault.retrieve(42).await;
        assert!(matches!(result, Err(VaultError::RecordNotFound(42))));
    }

    #[tokio::test]
    async fn test_retrieve_distinguishes_missing_object() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records);

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        // Simulate a consistency break: object vanishes behind the vault.
        objects.delete(&record.object_key).await.unwrap();

        let result = vault.retrieve(record.id).await;
        assert!(matches!(
            result,
            Err(VaultError::Storage(StoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_retrieve_rejects_tampered_blob() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records);

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        let mut blob = objects.get(&record.object_key).await.unwrap().to_vec();
        blob[20] ^= 0x01;
        objects
            .put(&record.object_key, Bytes::from(blob), "application/octet-stream")
            .await
            .unwrap();

        let result = vault.retrieve(record.id).await;
        assert!(matches!(
            result,
            Err(VaultError::Crypto(CryptoError::Integrity))
        ));
    }

    #[tokio::test]
    async fn test_retrieve_fails_under_different_master_key() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records.clone());

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        let other_vault = FileVault::new(objects, records, MasterKey::generate());
        let result = other_vault.retrieve(record.id).await;

        assert!(matches!(
            result,
            Err(VaultError::Crypto(CryptoError::InvalidWrappedKey))
        ));
    }

    #[tokio::test]
    async fn test_remove_then_retrieve_is_not_found() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records.clone());

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        vault.remove(record.id).await.unwrap();

        assert!(objects.is_empty());
        assert!(records.is_empty());
        assert!(matches!(
            vault.retrieve(record.id).await,
            Err(VaultError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_record_has_no_side_effects() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects.clone(), records.clone());

        vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        let result = vault.remove(999).await;
        assert!(matches!(result, Err(VaultError::RecordNotFound(999))));
        assert_eq!(objects.len(), 1);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_aborts_before_metadata_on_store_failure() {
        let objects = Arc::new(NoDeleteStore {
            inner: MemoryObjectStore::new(),
        });
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects, records.clone());

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        let result = vault.remove(record.id).await;
        assert!(matches!(result, Err(VaultError::Storage(_))));
        // The metadata row survives the aborted delete.
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_presigned_url_serves_the_object_key() {
        let objects = Arc::new(MemoryObjectStore::new());
        let records = Arc::new(MemoryFileRecords::new());
        let vault = vault_with(objects, records);

        let record = vault.ingest(1, "note.txt", "text/plain", PAYLOAD).await.unwrap();

        let url = vault
            .presigned_url(record.id, Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(url.contains(&record.object_key));

        assert!(matches!(
            vault.presigned_url(999, Duration::from_secs(60)).await,
            Err(VaultError::RecordNotFound(999))
        ));
    }
}
