use std::sync::atomic::{AtomicU32, Ordering};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::{ContainerAsync, GenericImage, ImageExt, runners::AsyncRunner};
use tokio::sync::OnceCell;

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

/// Unique, S3-valid bucket name.
pub fn unique_bucket() -> String {
    unique_id("hotconf-test")
}

pub const MINIO_ACCESS_KEY: &str = "minioadmin";
pub const MINIO_SECRET_KEY: &str = "minioadmin";
pub const MINIO_REGION: &str = "us-east-1";

pub struct MinioFixture {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    endpoint: String
}

impl MinioFixture {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn access_key(&self) -> &str {
        MINIO_ACCESS_KEY
    }

    pub fn secret_key(&self) -> &str {
        MINIO_SECRET_KEY
    }

    /// Path-style S3 client with the fixture's static credentials.
    pub async fn client(&self) -> aws_sdk_s3::Client {
        let credentials = aws_sdk_s3::config::Credentials::new(
            MINIO_ACCESS_KEY,
            MINIO_SECRET_KEY,
            None,
            None,
            "minio-fixture"
        );
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(MINIO_REGION))
            .endpoint_url(&self.endpoint)
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();
        aws_sdk_s3::Client::from_conf(s3_config)
    }

    /// Create `bucket` (if needed) and upload `body` under `key`.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<Vec<u8>>
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let client = self.client().await;

        if client.head_bucket().bucket(bucket).send().await.is_err() {
            client.create_bucket().bucket(bucket).send().await?;
        }

        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(body.into()))
            .send()
            .await?;

        Ok(())
    }
}

static MINIO: OnceCell<Option<MinioFixture>> = OnceCell::const_new();

/// Shared MinIO container, or `None` when it cannot be started.
pub async fn minio() -> Option<&'static MinioFixture> {
    MINIO
        .get_or_init(|| async {
            let image = GenericImage::new("minio/minio", "latest")
                .with_exposed_port(ContainerPort::Tcp(9000))
                .with_wait_for(WaitFor::message_on_stdout("API:"));

            let container_result = image
                .with_env_var("MINIO_ROOT_USER", MINIO_ACCESS_KEY)
                .with_env_var("MINIO_ROOT_PASSWORD", MINIO_SECRET_KEY)
                .with_cmd(vec!["server", "/data"])
                .start()
                .await;

            match container_result {
                Ok(container) => {
                    let port = container.get_host_port_ipv4(9000).await.ok()?;
                    let endpoint = format!("http://localhost:{}", port);
                    tracing::info!("MinIO fixture started on port {}", port);
                    Some(MinioFixture {
                        container,
                        endpoint
                    })
                }
                Err(e) => {
                    tracing::warn!("Failed to start MinIO container: {:?}", e);
                    None
                }
            }
        })
        .await
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unique_id_generation() {
        let id1 = unique_id("test");
        let id2 = unique_id("test");
        assert_ne!(id1, id2);
        assert!(id1.starts_with("test-"));
        assert!(id2.starts_with("test-"));
    }

    #[test]
    fn test_unique_bucket_is_lowercase() {
        let bucket = unique_bucket();
        assert!(bucket.starts_with("hotconf-test-"));
        assert_eq!(bucket, bucket.to_lowercase());
    }
}
