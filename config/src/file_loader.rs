//! # Settings File Loading
//!
//! Loads [`RepositorySettings`] from TOML or YAML files.
//!
//! Supports automatic format detection based on file extension.

use crate::settings::RepositorySettings;
use std::path::Path;

/// Settings file loading error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("Settings file has no extension")]
    NoExtension,

    #[error("Unsupported settings file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid settings: {0}")]
    Invalid(String)
}

/// Load repository settings from a TOML file.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Loads and validates repository settings from a TOML format file.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_settings_from_toml;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = load_settings_from_toml(Path::new("hotconf.toml"))?;
///     println!("Refresh every {} ms", settings.refresh_interval_ms);
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Returns `SettingsFileError` for:
/// - File not found
/// - Invalid TOML syntax
/// - Missing required fields or failed validation
pub fn load_settings_from_toml(path: &Path) -> Result<RepositorySettings, SettingsFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| SettingsFileError::FileNotFound(path.display().to_string()))?;

    let settings: RepositorySettings =
        toml::from_str(&contents).map_err(|e| SettingsFileError::TomlParse(e.to_string()))?;

    validated(settings)
}

/// Load repository settings from a YAML file.
pub fn load_settings_from_yaml(path: &Path) -> Result<RepositorySettings, SettingsFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| SettingsFileError::FileNotFound(path.display().to_string()))?;

    let settings: RepositorySettings = serde_yaml::from_str(&contents)
        .map_err(|e| SettingsFileError::YamlParse(e.to_string()))?;

    validated(settings)
}

/// Load repository settings, detecting the format from the extension.
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml`: YAML format
/// - `.yml`: YAML format
pub fn load_settings_from_file(path: &Path) -> Result<RepositorySettings, SettingsFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(SettingsFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_settings_from_toml(path),
        "yaml" | "yml" => load_settings_from_yaml(path),
        other => Err(SettingsFileError::UnsupportedFormat(other.to_string()))
    }
}

fn validated(settings: RepositorySettings) -> Result<RepositorySettings, SettingsFileError> {
    settings
        .check()
        .map_err(|e| SettingsFileError::Invalid(e.to_string()))?;
    Ok(settings)
}
