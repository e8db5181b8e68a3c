//! Filesystem-backed configuration repository.

use errors::ConfigError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storage::FileSystemLoader;

use crate::parser::{ConfigurationParser, ParserOptions, PayloadFormat};
use crate::repository::RefreshingRepository;

/// Repository name reported by `describe` and `UnsupportedMutation`.
pub const FILE_SYSTEM_REPOSITORY: &str = "FileSystemConfigurationRepository";

/// Builder for a read-only repository over a local payload file.
///
/// The file is re-read in full on every refresh. Unless
/// [`FileSystemRepositoryBuilder::format`] is called, the payload format is
/// detected from the file extension.
#[derive(Debug, Clone, Default)]
pub struct FileSystemRepositoryBuilder {
    file_name: Option<PathBuf>,
    refresh_interval: Duration,
    fail_on_unknown_fields: bool,
    format: Option<PayloadFormat>
}

impl FileSystemRepositoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_name(mut self, file_name: impl Into<PathBuf>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Zero disables periodic refresh.
    pub fn refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// An unset `options.format` keeps extension detection.
    pub fn parser_options(mut self, options: ParserOptions) -> Self {
        self.fail_on_unknown_fields = options.fail_on_unknown_fields;
        self.format = options.format.or(self.format);
        self
    }

    pub fn fail_on_unknown_fields(mut self, fail: bool) -> Self {
        self.fail_on_unknown_fields = fail;
        self
    }

    pub fn format(mut self, format: PayloadFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Load the file once and start the refresh schedule.
    ///
    /// # Errors
    ///
    /// `InvalidSettings` without a file name; otherwise the initial load or
    /// parse error.
    pub async fn build(self) -> Result<RefreshingRepository, ConfigError> {
        let path = self
            .file_name
            .ok_or_else(|| ConfigError::invalid_settings("file_name is required"))?;

        let options = ParserOptions {
            fail_on_unknown_fields: self.fail_on_unknown_fields,
            format: self.format
        }
        .detect_format(&path);

        RefreshingRepository::start(
            FILE_SYSTEM_REPOSITORY,
            Arc::new(FileSystemLoader::new(path)),
            ConfigurationParser::new(options),
            self.refresh_interval
        )
        .await
    }
}
