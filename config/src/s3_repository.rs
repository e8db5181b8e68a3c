//! S3-backed configuration repository.

use errors::ConfigError;
use hc_core::PayloadDecryptor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storage::{
    AwsObjectStore, CiphertextEncoding, KmsClient, KmsConfig, KmsDecryptor, ObjectStore,
    S3ClientSettings, S3Loader
};

use crate::parser::{ConfigurationParser, ParserOptions};
use crate::repository::RefreshingRepository;

/// Repository name reported by `describe` and `UnsupportedMutation`.
pub const S3_REPOSITORY: &str = "S3ConfigurationRepository";

enum Decryption {
    None,
    Kms {
        config: KmsConfig,
        encoding: CiphertextEncoding
    },
    Custom(Arc<dyn PayloadDecryptor>)
}

/// Builder for a read-only repository over one S3 object.
///
/// By default the object is fetched with an [`AwsObjectStore`] configured
/// from [`S3ClientSettings`]; tests and embedders can supply their own
/// [`ObjectStore`].
pub struct S3RepositoryBuilder {
    bucket: Option<String>,
    key: Option<String>,
    refresh_interval: Duration,
    client_settings: S3ClientSettings,
    object_store: Option<Arc<dyn ObjectStore>>,
    decryption: Decryption,
    parser_options: ParserOptions
}

impl Default for S3RepositoryBuilder {
    fn default() -> Self {
        Self {
            bucket: None,
            key: None,
            refresh_interval: Duration::ZERO,
            client_settings: S3ClientSettings::default(),
            object_store: None,
            decryption: Decryption::None,
            parser_options: ParserOptions::default()
        }
    }
}

impl S3RepositoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Zero disables periodic refresh.
    pub fn refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.client_settings.region = Some(region.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.client_settings.endpoint = Some(endpoint.into());
        self
    }

    pub fn force_path_style(mut self, force_path_style: bool) -> Self {
        self.client_settings.force_path_style = force_path_style;
        self
    }

    pub fn client_settings(mut self, settings: S3ClientSettings) -> Self {
        self.client_settings = settings;
        self
    }

    /// Use this store instead of building an AWS client.
    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    /// Decrypt fetched objects through KMS.
    pub fn kms(mut self, config: KmsConfig, encoding: CiphertextEncoding) -> Self {
        self.decryption = Decryption::Kms { config, encoding };
        self
    }

    pub fn decryptor(mut self, decryptor: Arc<dyn PayloadDecryptor>) -> Self {
        self.decryption = Decryption::Custom(decryptor);
        self
    }

    pub fn parser_options(mut self, options: ParserOptions) -> Self {
        self.parser_options = options;
        self
    }

    /// Fetch the object once and start the refresh schedule.
    ///
    /// # Errors
    ///
    /// `InvalidSettings` when bucket or key is missing or the KMS client
    /// cannot be configured; otherwise the initial load, decrypt or parse
    /// error.
    pub async fn build(self) -> Result<RefreshingRepository, ConfigError> {
        let bucket = non_empty(self.bucket, "bucket")?;
        let key = non_empty(self.key, "key")?;
        let parser = ConfigurationParser::new(self.parser_options.detect_format(Path::new(&key)));

        let store = match self.object_store {
            Some(store) => store,
            None => Arc::new(AwsObjectStore::new(&self.client_settings).await)
        };

        let mut loader = S3Loader::new(bucket, key, store);
        match self.decryption {
            Decryption::None => {}
            Decryption::Kms { config, encoding } => {
                let client = KmsClient::new(config)
                    .await
                    .map_err(ConfigError::invalid_settings)?;
                loader = loader.with_decryptor(Arc::new(KmsDecryptor::new(client, encoding)));
            }
            Decryption::Custom(decryptor) => {
                loader = loader.with_decryptor(decryptor);
            }
        }

        RefreshingRepository::start(
            S3_REPOSITORY,
            Arc::new(loader),
            parser,
            self.refresh_interval
        )
        .await
    }
}

fn non_empty(value: Option<String>, field: &str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::invalid_settings(format!("{} is required", field)))
    }
}
