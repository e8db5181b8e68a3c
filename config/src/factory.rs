//! Entry points for constructing repositories.

use errors::ConfigError;
use hc_core::ConfigurationRepository;
use std::sync::Arc;
use storage::KmsConfig;
use tracing::info;

use crate::file_repository::FileSystemRepositoryBuilder;
use crate::memory_repository::InMemoryConfigurationRepository;
use crate::repository::RefreshingRepository;
use crate::s3_repository::S3RepositoryBuilder;
use crate::settings::{RepositorySettings, SourceSettings};

/// Constructs repositories by backend or from [`RepositorySettings`].
pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn file_system_configuration_repository() -> FileSystemRepositoryBuilder {
        FileSystemRepositoryBuilder::new()
    }

    pub fn s3_configuration_repository() -> S3RepositoryBuilder {
        S3RepositoryBuilder::new()
    }

    pub fn in_memory_configuration_repository() -> InMemoryConfigurationRepository {
        InMemoryConfigurationRepository::new()
    }

    /// Validate `settings` and build the matching backend.
    pub async fn build(
        settings: &RepositorySettings
    ) -> Result<Arc<dyn ConfigurationRepository>, ConfigError> {
        let repository = Self::build_refreshing(settings).await?;
        Ok(Arc::new(repository))
    }

    /// Like [`RepositoryFactory::build`], keeping access to reload,
    /// subscribe and shutdown.
    pub async fn build_refreshing(
        settings: &RepositorySettings
    ) -> Result<RefreshingRepository, ConfigError> {
        settings.check()?;

        let repository = match &settings.source {
            SourceSettings::File { path } => {
                Self::file_system_configuration_repository()
                    .file_name(path)
                    .refresh_interval(settings.refresh_interval())
                    .parser_options(settings.parser)
                    .build()
                    .await?
            }
            source @ SourceSettings::S3 {
                bucket,
                key,
                ciphertext_encoding,
                ..
            } => {
                let mut builder = Self::s3_configuration_repository()
                    .bucket(bucket)
                    .key(key)
                    .refresh_interval(settings.refresh_interval())
                    .parser_options(settings.parser);
                if let Some(client) = source.s3_client_settings() {
                    builder = builder.client_settings(client);
                }
                if let Some(kms) = source.kms_config() {
                    builder = builder.kms(kms, *ciphertext_encoding);
                }
                builder.build().await?
            }
        };

        info!(repository = %repository.describe(), "Configuration repository ready");
        Ok(repository)
    }

    /// Build with a caller-supplied KMS configuration, e.g. a local key ring
    /// in development.
    pub async fn build_with_kms(
        settings: &RepositorySettings,
        kms: KmsConfig
    ) -> Result<RefreshingRepository, ConfigError> {
        settings.check()?;
        match &settings.source {
            source @ SourceSettings::S3 {
                bucket,
                key,
                ciphertext_encoding,
                ..
            } => {
                let mut builder = Self::s3_configuration_repository()
                    .bucket(bucket)
                    .key(key)
                    .refresh_interval(settings.refresh_interval())
                    .parser_options(settings.parser)
                    .kms(kms, *ciphertext_encoding);
                if let Some(client) = source.s3_client_settings() {
                    builder = builder.client_settings(client);
                }
                builder.build().await
            }
            SourceSettings::File { .. } => Err(ConfigError::invalid_settings(
                "KMS decryption is only supported for S3 sources"
            ))
        }
    }
}
