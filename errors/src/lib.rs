//! # hotconf Errors
//!
//! Error taxonomy shared by loaders, repositories and typed accessors.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields everywhere so messages carry their own context
//! - Every variant that originates from a backing store names the source
//!   coordinate (`s3://bucket/key`, a file path) it failed against

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Configuration system errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O or transport failure reaching the backing store.
    #[error("Configuration source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// The fetched payload could not be decrypted.
    #[error("Failed to decrypt configuration from {source_name}: {reason}")]
    Decrypt { source_name: String, reason: String },

    /// Malformed or structurally invalid payload.
    #[error("Failed to parse configuration from {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// A stored value does not match the accessor's declared type.
    #[error("Value of {alias} at {path} does not match declared type: expected {expected}, found {found}")]
    TypeMismatch {
        alias: String,
        path: String,
        expected: String,
        found: String
    },

    /// A write was attempted against a read-only repository.
    #[error("{repository} does not allow any changes")]
    UnsupportedMutation { repository: String },

    /// Repository settings or builder arguments are invalid.
    #[error("Invalid repository settings: {reason}")]
    InvalidSettings { reason: String }
}

impl ConfigError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string()
        }
    }

    pub fn decrypt(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decrypt {
            source_name: source_name.into(),
            reason: reason.to_string()
        }
    }

    pub fn parse(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            reason: reason.to_string()
        }
    }

    pub fn invalid_settings(reason: impl ToString) -> Self {
        Self::InvalidSettings {
            reason: reason.to_string()
        }
    }

    /// True for the errors a reload can fail with: the scheduled refresh
    /// path logs and suppresses exactly these.
    pub fn is_reload_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::Decrypt { .. } | Self::Parse { .. }
        )
    }

    /// Stable short label, used for metric and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::Decrypt { .. } => "decrypt",
            Self::Parse { .. } => "parse",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::UnsupportedMutation { .. } => "unsupported_mutation",
            Self::InvalidSettings { .. } => "invalid_settings"
        }
    }

    /// Re-labels the source of a reload failure. Parsers do not know where
    /// their text came from, so repositories attach the coordinate here.
    pub fn with_source(self, source_name: impl Into<String>) -> Self {
        let source_name = source_name.into();
        match self {
            Self::SourceUnavailable { reason, .. } => Self::SourceUnavailable {
                source_name,
                reason
            },
            Self::Decrypt { reason, .. } => Self::Decrypt {
                source_name,
                reason
            },
            Self::Parse { reason, .. } => Self::Parse {
                source_name,
                reason
            },
            other => other
        }
    }
}
