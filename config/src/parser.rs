//! # Configuration Parser
//!
//! Turns a raw payload into configuration records.
//!
//! The payload is a top-level sequence of entries:
//!
//! ```json
//! [
//!   { "alias": "some.configuration.some.value", "defaultValue": "x" },
//!   { "alias": "some.configuration.limits", "defaultValue": { "max": 10 },
//!     "description": "Upper bounds" }
//! ]
//! ```
//!
//! `alias` and `defaultValue` are required; `description` and `metadata` are
//! optional. Other fields are ignored unless
//! [`ParserOptions::fail_on_unknown_fields`] is set. Parsing is all or
//! nothing: a malformed payload yields an error and no records.

use errors::ConfigError;
use hc_core::ConfigurationRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Source name used in parse errors until a repository attaches the real
/// coordinate.
const PAYLOAD_SOURCE: &str = "<payload>";

/// Payload syntax.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PayloadFormat {
    #[default]
    Json,
    Yaml
}

impl PayloadFormat {
    /// Detect the format from a file extension; anything that is not
    /// `.yaml`/`.yml` is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json
        }
    }
}

/// Parser behaviour knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Reject entries carrying fields other than `alias`, `defaultValue`,
    /// `description` and `metadata`.
    #[serde(default)]
    pub fail_on_unknown_fields: bool,

    /// `None` detects the format from the payload's path or key, falling
    /// back to JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<PayloadFormat>
}

impl ParserOptions {
    /// The format the parser will use.
    pub fn payload_format(&self) -> PayloadFormat {
        self.format.unwrap_or_default()
    }

    /// Fill in an unset format from `path`'s extension.
    pub fn detect_format(self, path: &Path) -> Self {
        Self {
            format: Some(self.format.unwrap_or_else(|| PayloadFormat::from_path(path))),
            ..self
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    alias: String,
    default_value: Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StrictEntry {
    alias: String,
    default_value: Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>
}

impl From<StrictEntry> for Entry {
    fn from(entry: StrictEntry) -> Self {
        Self {
            alias: entry.alias,
            default_value: entry.default_value,
            description: entry.description,
            metadata: entry.metadata
        }
    }
}

/// Parses payloads into [`ConfigurationRecord`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigurationParser {
    options: ParserOptions
}

impl ConfigurationParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse a payload. Errors carry a placeholder source name; callers that
    /// know the coordinate relabel with [`ConfigError::with_source`].
    pub fn parse(&self, text: &str) -> Result<Vec<ConfigurationRecord>, ConfigError> {
        let entries: Vec<Entry> = if self.options.fail_on_unknown_fields {
            self.deserialize::<StrictEntry>(text)?
                .into_iter()
                .map(Entry::from)
                .collect()
        } else {
            self.deserialize::<Entry>(text)?
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if entry.alias.trim().is_empty() {
                return Err(ConfigError::parse(
                    PAYLOAD_SOURCE,
                    format!("entry {} has an empty alias", index)
                ));
            }
            records.push(ConfigurationRecord {
                alias: entry.alias,
                default_value: entry.default_value,
                description: entry.description,
                metadata: entry.metadata
            });
        }

        Ok(records)
    }

    /// Render records back into a payload in the configured format.
    pub fn serialize(&self, records: &[ConfigurationRecord]) -> Result<String, ConfigError> {
        match self.options.payload_format() {
            PayloadFormat::Json => serde_json::to_string_pretty(records)
                .map_err(|e| ConfigError::parse(PAYLOAD_SOURCE, e)),
            PayloadFormat::Yaml => {
                serde_yaml::to_string(records).map_err(|e| ConfigError::parse(PAYLOAD_SOURCE, e))
            }
        }
    }

    fn deserialize<T: serde::de::DeserializeOwned>(&self, text: &str) -> Result<Vec<T>, ConfigError> {
        match self.options.payload_format() {
            PayloadFormat::Json => {
                serde_json::from_str(text).map_err(|e| ConfigError::parse(PAYLOAD_SOURCE, e))
            }
            PayloadFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| ConfigError::parse(PAYLOAD_SOURCE, e))
            }
        }
    }
}
