//! # Environment Variable Loader
//!
//! Loads repository settings from environment variables following 12-factor
//! app principles.
//!
//! # Naming Convention
//! - `HOTCONF_FILE`: selects the filesystem backend
//! - `HOTCONF_S3_*`: selects the S3 backend
//! - `HOTCONF_KMS_*`: payload decryption for S3
//! - Everything else applies to either backend

use crate::parser::{ParserOptions, PayloadFormat};
use crate::settings::{RepositorySettings, SourceSettings};
use errors::ConfigError;
use std::env;
use std::path::{Path, PathBuf};
use storage::CiphertextEncoding;

/// Load repository settings from environment variables.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Builds [`RepositorySettings`] for deployments that configure the
/// repository through the environment. `HOTCONF_FILE` wins when both a file
/// and a bucket are set.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_settings_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = load_settings_from_env()?;
///     println!("Refresh every {} ms", settings.refresh_interval_ms);
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// ### Source
/// - `HOTCONF_FILE`: payload file path
/// - `HOTCONF_S3_BUCKET`, `HOTCONF_S3_KEY`: payload object
/// - `HOTCONF_S3_REGION`: AWS region (default: provider chain)
/// - `HOTCONF_S3_ENDPOINT`: custom endpoint, e.g. MinIO
/// - `HOTCONF_S3_FORCE_PATH_STYLE`: true/false (default: false)
/// - `HOTCONF_KMS_KEY_ID`: decrypt objects with this AWS KMS key
/// - `HOTCONF_CIPHERTEXT_ENCODING`: binary/base64 (default: binary)
///
/// ### Behaviour
/// - `HOTCONF_REFRESH_INTERVAL_MS`: refresh period, 0 = off (default: 0)
/// - `HOTCONF_FAIL_ON_UNKNOWN_FIELDS`: true/false (default: false)
/// - `HOTCONF_FORMAT`: json/yaml (default: from the file extension, else
///   json)
///
/// ## Errors
/// `InvalidSettings` when no source is configured, a variable does not
/// parse, or the result fails validation.
pub fn load_settings_from_env() -> Result<RepositorySettings, ConfigError> {
    let source = load_source_from_env()?;

    let default_format = match &source {
        SourceSettings::File { path } => PayloadFormat::from_path(path),
        SourceSettings::S3 { key, .. } => PayloadFormat::from_path(Path::new(key))
    };

    let settings = RepositorySettings {
        refresh_interval_ms: parse_env("HOTCONF_REFRESH_INTERVAL_MS")?.unwrap_or(0),
        source,
        parser: ParserOptions {
            fail_on_unknown_fields: parse_env("HOTCONF_FAIL_ON_UNKNOWN_FIELDS")?.unwrap_or(false),
            format: Some(parse_env("HOTCONF_FORMAT")?.unwrap_or(default_format))
        }
    };

    settings.check()?;
    Ok(settings)
}

fn load_source_from_env() -> Result<SourceSettings, ConfigError> {
    if let Some(path) = var("HOTCONF_FILE") {
        return Ok(SourceSettings::File {
            path: PathBuf::from(path)
        });
    }

    match (var("HOTCONF_S3_BUCKET"), var("HOTCONF_S3_KEY")) {
        (Some(bucket), Some(key)) => Ok(SourceSettings::S3 {
            bucket,
            key,
            region: var("HOTCONF_S3_REGION"),
            endpoint: var("HOTCONF_S3_ENDPOINT"),
            force_path_style: parse_env("HOTCONF_S3_FORCE_PATH_STYLE")?.unwrap_or(false),
            kms_key_id: var("HOTCONF_KMS_KEY_ID"),
            ciphertext_encoding: ciphertext_encoding_from_env()?
        }),
        (Some(_), None) => Err(ConfigError::invalid_settings(
            "HOTCONF_S3_KEY is required with HOTCONF_S3_BUCKET"
        )),
        (None, Some(_)) => Err(ConfigError::invalid_settings(
            "HOTCONF_S3_BUCKET is required with HOTCONF_S3_KEY"
        )),
        (None, None) => Err(ConfigError::invalid_settings(
            "set HOTCONF_FILE or HOTCONF_S3_BUCKET and HOTCONF_S3_KEY"
        ))
    }
}

fn ciphertext_encoding_from_env() -> Result<CiphertextEncoding, ConfigError> {
    match var("HOTCONF_CIPHERTEXT_ENCODING").map(|v| v.to_lowercase()).as_deref() {
        None | Some("binary") => Ok(CiphertextEncoding::Binary),
        Some("base64") => Ok(CiphertextEncoding::Base64),
        Some(other) => Err(ConfigError::invalid_settings(format!(
            "HOTCONF_CIPHERTEXT_ENCODING: unsupported encoding {}",
            other
        )))
    }
}

/// Set and non-blank.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display
{
    match var(key) {
        Some(s) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::invalid_settings(format!("{}: {}", key, e))),
        None => Ok(None)
    }
}
