//! S3 loader against a MinIO container. Skips when Docker is unavailable.

use hc_core::{RawLoader, SourceCoordinate};
use std::collections::HashMap;
use std::sync::Arc;
use storage::{AwsObjectStore, CiphertextEncoding, KmsClient, KmsConfig, KmsDecryptor, S3Loader};
use testing::{minio, unique_bucket};

const PAYLOAD: &str = r#"[{"alias":"a.b.c","defaultValue":true}]"#;

#[tokio::test]
async fn test_s3_loader_fetches_object() {
    let Some(minio) = minio().await else {
        eprintln!("Skipping MinIO test: Docker not available");
        return;
    };
    let bucket = unique_bucket();
    minio.put_object(&bucket, "app/config.json", PAYLOAD).await.unwrap();

    let store = Arc::new(AwsObjectStore::from_client(minio.client().await));
    let loader = S3Loader::new(&bucket, "app/config.json", store);

    assert_eq!(loader.load().await.unwrap(), PAYLOAD);
    assert_eq!(
        loader.coordinate(),
        SourceCoordinate::ObjectStore {
            bucket: bucket.clone(),
            key: "app/config.json".to_string()
        }
    );
}

#[tokio::test]
async fn test_s3_loader_missing_object_is_unavailable() {
    let Some(minio) = minio().await else {
        eprintln!("Skipping MinIO test: Docker not available");
        return;
    };
    let bucket = unique_bucket();
    minio.put_object(&bucket, "present.json", "[]").await.unwrap();

    let store = Arc::new(AwsObjectStore::from_client(minio.client().await));
    let loader = S3Loader::new(&bucket, "absent.json", store);

    let err = loader.load().await.unwrap_err();
    assert!(err.is_reload_failure());
    assert_eq!(err.kind(), "source_unavailable");
}

#[tokio::test]
async fn test_s3_loader_decrypts_base64_ciphertext() {
    let Some(minio) = minio().await else {
        eprintln!("Skipping MinIO test: Docker not available");
        return;
    };

    let keys = HashMap::from([("config-key".to_string(), hex::encode([7u8; 32]))]);
    let kms = KmsClient::new(KmsConfig::Local { keys }).await.unwrap();
    let ciphertext = kms.encrypt("config-key", PAYLOAD.as_bytes()).await.unwrap();
    let armoured = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, ciphertext);

    let bucket = unique_bucket();
    minio.put_object(&bucket, "secret.json", armoured).await.unwrap();

    let store = Arc::new(AwsObjectStore::from_client(minio.client().await));
    let loader = S3Loader::new(&bucket, "secret.json", store)
        .with_decryptor(Arc::new(KmsDecryptor::new(kms, CiphertextEncoding::Base64)));

    assert_eq!(loader.load().await.unwrap(), PAYLOAD);
}
