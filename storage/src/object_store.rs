//! # Object Store Loader
//!
//! Fetches configuration payloads from S3 (or any S3-compatible store such as
//! MinIO), optionally decrypting them with KMS before they are parsed.

use async_trait::async_trait;
use errors::ConfigError;
use hc_core::{PayloadDecryptor, RawLoader, SourceCoordinate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Object store error.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("Object s3://{bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("Download of s3://{bucket}/{key} failed: {reason}")]
    DownloadError {
        bucket: String,
        key: String,
        reason: String
    }
}

/// Minimal object store surface needed to fetch a payload.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;
}

/// Client settings for [`AwsObjectStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3ClientSettings {
    /// AWS region; falls back to the default provider chain when unset.
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint, e.g. a MinIO URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Path-style addressing, required by most S3-compatible stores.
    #[serde(default)]
    pub force_path_style: bool
}

/// [`ObjectStore`] backed by the AWS S3 SDK.
#[derive(Clone)]
pub struct AwsObjectStore {
    client: aws_sdk_s3::Client
}

impl AwsObjectStore {
    pub async fn new(settings: &S3ClientSettings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(settings.force_path_style)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config)
        }
    }

    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for AwsObjectStore {
    async fn download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .is_some_and(aws_sdk_s3::operation::get_object::GetObjectError::is_no_such_key);
                if not_found {
                    ObjectStoreError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string()
                    }
                } else {
                    ObjectStoreError::DownloadError {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        reason: aws_sdk_s3::error::DisplayErrorContext(&e).to_string()
                    }
                }
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::DownloadError {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: e.to_string()
            })?;

        Ok(data.into_bytes().to_vec())
    }
}

/// Loads a payload from `s3://bucket/key`.
#[derive(Clone)]
pub struct S3Loader {
    bucket: String,
    key: String,
    store: Arc<dyn ObjectStore>,
    decryptor: Option<Arc<dyn PayloadDecryptor>>
}

impl S3Loader {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            store,
            decryptor: None
        }
    }

    /// Decrypt every fetched payload before handing it to the parser.
    pub fn with_decryptor(mut self, decryptor: Arc<dyn PayloadDecryptor>) -> Self {
        self.decryptor = Some(decryptor);
        self
    }

    pub fn s3_path(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

#[async_trait]
impl RawLoader for S3Loader {
    async fn load(&self) -> Result<String, ConfigError> {
        let s3_path = self.s3_path();
        tracing::debug!(source = %s3_path, "Fetching configuration object");

        let body = self
            .store
            .download_object(&self.bucket, &self.key)
            .await
            .map_err(|e| ConfigError::source_unavailable(&s3_path, e))?;

        let plaintext = match &self.decryptor {
            Some(decryptor) => decryptor
                .decrypt(&body)
                .await
                .map_err(|e| e.with_source(&s3_path))?,
            None => body
        };

        String::from_utf8(plaintext).map_err(|e| {
            ConfigError::source_unavailable(&s3_path, format!("payload is not valid UTF-8: {}", e))
        })
    }

    fn coordinate(&self) -> SourceCoordinate {
        SourceCoordinate::ObjectStore {
            bucket: self.bucket.clone(),
            key: self.key.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kms_integration::{CiphertextEncoding, KmsClient, KmsConfig, KmsDecryptor};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryStore {
        objects: Mutex<HashMap<(String, String), Vec<u8>>>
    }

    impl InMemoryStore {
        fn with_object(bucket: &str, key: &str, body: &[u8]) -> Self {
            let store = Self::default();
            store
                .objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), body.to_vec());
            store
        }
    }

    #[async_trait]
    impl ObjectStore for InMemoryStore {
        async fn download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
            self.objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| ObjectStoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string()
                })
        }
    }

    #[tokio::test]
    async fn test_load_plaintext_object() {
        let store = Arc::new(InMemoryStore::with_object("configs", "app.json", b"[]"));
        let loader = S3Loader::new("configs", "app.json", store);
        assert_eq!(loader.load().await.unwrap(), "[]");
        assert_eq!(loader.s3_path(), "s3://configs/app.json");
    }

    #[tokio::test]
    async fn test_missing_object_names_coordinate() {
        let store = Arc::new(InMemoryStore::default());
        let loader = S3Loader::new("configs", "missing.json", store);

        let err = loader.load().await.unwrap_err();
        match err {
            ConfigError::SourceUnavailable {
                source_name,
                reason
            } => {
                assert_eq!(source_name, "s3://configs/missing.json");
                assert!(reason.contains("not found"));
            }
            other => panic!("Expected SourceUnavailable, got {:?}", other)
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_source_error() {
        let store = Arc::new(InMemoryStore::with_object("b", "k", &[0xff, 0xfe]));
        let loader = S3Loader::new("b", "k", store);
        assert!(matches!(
            loader.load().await,
            Err(ConfigError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_encrypted_object_is_decrypted() {
        let mut keys = HashMap::new();
        keys.insert("config-key".to_string(), hex::encode(vec![5u8; 32]));
        let kms = KmsClient::new(KmsConfig::Local { keys }).await.unwrap();
        let payload = br#"[{"alias":"a.b.c","defaultValue":true}]"#;
        let ciphertext = kms.encrypt("config-key", payload).await.unwrap();

        let store = Arc::new(InMemoryStore::with_object("b", "k", &ciphertext));
        let loader = S3Loader::new("b", "k", store).with_decryptor(Arc::new(KmsDecryptor::new(
            kms,
            CiphertextEncoding::Binary
        )));

        assert_eq!(loader.load().await.unwrap().as_bytes(), payload);
    }

    #[tokio::test]
    async fn test_decrypt_failure_names_coordinate() {
        let mut keys = HashMap::new();
        keys.insert("config-key".to_string(), hex::encode(vec![5u8; 32]));
        let kms = KmsClient::new(KmsConfig::Local { keys }).await.unwrap();

        // Plaintext body where ciphertext is expected: the header names an
        // unknown key.
        let store = Arc::new(InMemoryStore::with_object("b", "k", b"[]"));
        let loader = S3Loader::new("b", "k", store).with_decryptor(Arc::new(KmsDecryptor::new(
            kms,
            CiphertextEncoding::Binary
        )));

        match loader.load().await.unwrap_err() {
            ConfigError::Decrypt { source_name, .. } => assert_eq!(source_name, "s3://b/k"),
            other => panic!("Expected Decrypt, got {:?}", other)
        }
    }
}
