//! S3 repository against MinIO. Every test skips when Docker is unavailable.

use accessor::{ConfigAccessor, ConfigError, config_interface};
use config::{ReloadOutcome, S3RepositoryBuilder};
use hc_core::ConfigurationRepository;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use storage::{AwsObjectStore, CiphertextEncoding, KmsClient, KmsConfig};
use testing::{MinioFixture, minio, unique_bucket};

config_interface! {
    struct Service in "service" {
        fn name() -> String;
        fn replicas() -> u8 = 1;
    }
}

async fn store(minio: &MinioFixture) -> Arc<AwsObjectStore> {
    Arc::new(AwsObjectStore::from_client(minio.client().await))
}

#[tokio::test]
async fn test_s3_repository_reloads_new_object_versions() {
    let Some(minio) = minio().await else {
        eprintln!("Skipping MinIO test: Docker not available");
        return;
    };
    let bucket = unique_bucket();
    minio
        .put_object(&bucket, "service.json", r#"[{"alias":"service.name","defaultValue":"api"}]"#)
        .await
        .unwrap();

    let repo = Arc::new(
        S3RepositoryBuilder::new()
            .bucket(&bucket)
            .key("service.json")
            .object_store(store(minio).await)
            .build()
            .await
            .unwrap()
    );
    let service = Service::new(&ConfigAccessor::new(repo.clone()));

    assert_eq!(service.name().unwrap(), Some("api".to_string()));
    assert_eq!(service.replicas().unwrap(), 1);
    assert_eq!(repo.describe(), format!("S3ConfigurationRepository (s3://{}/service.json)", bucket));

    minio
        .put_object(
            &bucket,
            "service.json",
            r#"[{"alias":"service.name","defaultValue":"api"},{"alias":"service.replicas","defaultValue":3}]"#
        )
        .await
        .unwrap();
    assert!(matches!(repo.reload().await.unwrap(), ReloadOutcome::Published(_)));
    assert_eq!(service.replicas().unwrap(), 3);

    assert!(matches!(repo.reload().await.unwrap(), ReloadOutcome::Unchanged(_)));
    assert!(matches!(
        repo.put("service.name", serde_json::json!("x")),
        Err(ConfigError::UnsupportedMutation { .. })
    ));
}

#[tokio::test]
async fn test_s3_repository_fails_fast_on_missing_object() {
    let Some(minio) = minio().await else {
        eprintln!("Skipping MinIO test: Docker not available");
        return;
    };
    let bucket = unique_bucket();
    minio.put_object(&bucket, "other.json", "[]").await.unwrap();

    let result = S3RepositoryBuilder::new()
        .bucket(&bucket)
        .key("missing.json")
        .object_store(store(minio).await)
        .build()
        .await;

    match result {
        Err(ConfigError::SourceUnavailable { source_name, .. }) => {
            assert_eq!(source_name, format!("s3://{}/missing.json", bucket));
        }
        Err(other) => panic!("Expected SourceUnavailable, got {:?}", other),
        Ok(_) => panic!("Expected SourceUnavailable, got a repository")
    }
}

#[tokio::test]
async fn test_s3_repository_decrypts_and_keeps_snapshot_on_bad_ciphertext() {
    let Some(minio) = minio().await else {
        eprintln!("Skipping MinIO test: Docker not available");
        return;
    };
    let keys = HashMap::from([("config-key".to_string(), "11".repeat(32))]);
    let kms = KmsClient::new(KmsConfig::Local { keys: keys.clone() }).await.unwrap();
    let ciphertext = kms
        .encrypt("config-key", br#"[{"alias":"service.name","defaultValue":"secret"}]"#)
        .await
        .unwrap();

    let bucket = unique_bucket();
    minio.put_object(&bucket, "service.bin", ciphertext).await.unwrap();

    let repo = Arc::new(
        S3RepositoryBuilder::new()
            .bucket(&bucket)
            .key("service.bin")
            .object_store(store(minio).await)
            .kms(KmsConfig::Local { keys }, CiphertextEncoding::Binary)
            .refresh_interval(Duration::from_secs(3600))
            .build()
            .await
            .unwrap()
    );
    let service = Service::new(&ConfigAccessor::new(repo.clone()));
    assert_eq!(service.name().unwrap(), Some("secret".to_string()));

    minio.put_object(&bucket, "service.bin", vec![0u8]).await.unwrap();
    assert!(repo.reload().await.is_err());
    assert_eq!(service.name().unwrap(), Some("secret".to_string()));

    repo.shutdown();
}
