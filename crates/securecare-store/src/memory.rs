//! In-memory object store for testing and development

use crate::{ObjectStore, Result, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// An in-memory object store
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Check for a key without fetching the body
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// Content type recorded for a stored object
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .get(key)
            .map(|entry| entry.value().content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.objects
            .get(key)
            .map(|entry| entry.value().data.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.remove(key);
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> Result<String> {
        // Fabricated URL with the same shape a real presigner produces.
        Ok(format!(
            "https://securecare.example.test/{}?X-Amz-Expires={}",
            key,
            ttl.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryObjectStore::new();

        store
            .put("patients/1/abc-note.txt", Bytes::from_static(b"sealed"), "application/octet-stream")
            .await
            .unwrap();

        let body = store.get("patients/1/abc-note.txt").await.unwrap();
        assert_eq!(body.as_ref(), b"sealed");
        assert_eq!(
            store.content_type("patients/1/abc-note.txt").as_deref(),
            Some("application/octet-stream")
        );
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryObjectStore::new();
        let result = store.get("patients/9/missing").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryObjectStore::new();
        store
            .put("k", Bytes::from_static(b"x"), "application/octet-stream")
            .await
            .unwrap();

        store.delete("k").await.unwrap();
        assert!(!store.contains("k"));

        // Second delete of the same key still succeeds.
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_presigned_url_carries_key_and_ttl() {
        let store = MemoryObjectStore::new();
        let url = store
            .presigned_get_url("patients/1/abc-note.txt", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.contains("patients/1/abc-note.txt"));
        assert!(url.contains("X-Amz-Expires=3600"));
    }
}
