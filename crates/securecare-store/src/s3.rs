//! S3-compatible object store backend
//!
//! Talks to any S3-compatible endpoint; production deployments point it
//! at a Backblaze B2 bucket via `endpoint` + path-style addressing. The
//! client is constructed once at startup from static credentials and
//! injected into the workflows.

use crate::{ObjectStore, Result, StoreError};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

/// Connection settings for an S3-compatible store
#[derive(Clone, Debug)]
pub struct S3Config {
    /// Bucket holding the encrypted objects
    pub bucket: String,
    /// Region name; B2 accepts any value here
    pub region: String,
    /// Endpoint override for non-AWS providers (e.g. B2)
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Object store backed by an S3-compatible service
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build the client once from static credentials.
    pub fn new(config: S3Config) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "securecare-config",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .region(aws_types::region::Region::new(config.region))
            .credentials_provider(credentials)
            .behavior_version_latest();

        if let Some(endpoint) = config.endpoint {
            // B2 and most S3 clones require path-style addressing.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("put failed for {}: {}", key, e)))?;

        debug!("uploaded {} bytes to s3://{}/{}", size, self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Unavailable(format!("get failed for {}: {}", key, service_err))
                }
            })?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to read body for {}: {}", key, e)))?;

        let bytes = body.into_bytes();
        debug!("downloaded {} bytes from s3://{}/{}", bytes.len(), self.bucket, key);
        Ok(bytes)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("delete failed for {}: {}", key, e)))?;

        debug!("deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StoreError::Presign(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StoreError::Presign(format!("presign failed for {}: {}", key, e)))?;

        Ok(request.uri().to_string())
    }
}
