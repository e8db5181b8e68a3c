//! # Repository Settings
//!
//! Declarative description of one configuration repository, loadable from a
//! settings file or from `HOTCONF_*` environment variables.

use errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use storage::{CiphertextEncoding, KmsConfig, S3ClientSettings};
use validator::Validate;

use crate::parser::ParserOptions;

/// Upper bound on the refresh interval: one day.
pub const MAX_REFRESH_INTERVAL_MS: u64 = 86_400_000;

/// Settings for one repository.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Selects the backend, the refresh cadence and the parser behaviour.
///
/// ## Fields
/// - `refresh_interval_ms`: period between scheduled reloads; 0 disables
///   them (default: 0)
/// - `source`: where the payload lives
/// - `parser`: unknown-field strictness and payload format
///
/// ## Example (TOML)
/// ```toml
/// refresh_interval_ms = 30000
///
/// [source]
/// type = "s3"
/// bucket = "configs"
/// key = "app/config.json"
/// region = "eu-west-1"
/// kms_key_id = "alias/config"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RepositorySettings {
    #[serde(default)]
    #[validate(range(max = 86400000))]
    pub refresh_interval_ms: u64,

    #[validate(custom(function = "validate_source"))]
    pub source: SourceSettings,

    #[serde(default)]
    pub parser: ParserOptions
}

/// Payload location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSettings {
    File {
        path: PathBuf
    },

    S3 {
        bucket: String,
        key: String,

        #[serde(default)]
        region: Option<String>,

        /// Custom endpoint such as a MinIO URL.
        #[serde(default)]
        endpoint: Option<String>,

        #[serde(default)]
        force_path_style: bool,

        /// Decrypt objects with this AWS KMS key when set.
        #[serde(default)]
        kms_key_id: Option<String>,

        #[serde(default)]
        ciphertext_encoding: CiphertextEncoding
    }
}

fn validate_source(source: &SourceSettings) -> Result<(), validator::ValidationError> {
    match source {
        SourceSettings::File { path } if path.as_os_str().is_empty() => Err(
            validator::ValidationError::new("File source requires a path")
        ),
        SourceSettings::S3 { bucket, .. } if bucket.trim().is_empty() => Err(
            validator::ValidationError::new("S3 source requires a bucket")
        ),
        SourceSettings::S3 { key, .. } if key.trim().is_empty() => Err(
            validator::ValidationError::new("S3 source requires a key")
        ),
        SourceSettings::S3 {
            kms_key_id: Some(key_id),
            ..
        } if key_id.trim().is_empty() => Err(validator::ValidationError::new(
            "KMS key id must not be blank"
        )),
        _ => Ok(())
    }
}

impl RepositorySettings {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            refresh_interval_ms: 0,
            source: SourceSettings::File { path: path.into() },
            parser: ParserOptions::default()
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Run the `validator` rules, flattened into one `InvalidSettings`.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::invalid_settings(e.to_string()))
    }
}

impl SourceSettings {
    /// S3 client settings, for S3 sources.
    pub fn s3_client_settings(&self) -> Option<S3ClientSettings> {
        match self {
            Self::S3 {
                region,
                endpoint,
                force_path_style,
                ..
            } => Some(S3ClientSettings {
                region: region.clone(),
                endpoint: endpoint.clone(),
                force_path_style: *force_path_style
            }),
            Self::File { .. } => None
        }
    }

    /// KMS configuration, for S3 sources with a key id.
    pub fn kms_config(&self) -> Option<KmsConfig> {
        match self {
            Self::S3 {
                region,
                kms_key_id: Some(key_id),
                ..
            } => Some(KmsConfig::AwsKms {
                region: region.clone(),
                key_id: Some(key_id.clone()),
                endpoint: None
            }),
            _ => None
        }
    }
}
