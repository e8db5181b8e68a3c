//! # Filesystem Loader
//!
//! Reads a configuration payload from a local file.

use async_trait::async_trait;
use errors::ConfigError;
use hc_core::{RawLoader, SourceCoordinate};
use std::path::{Path, PathBuf};

/// Loads the full contents of one file on every call.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    path: PathBuf
}

impl FileSystemLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RawLoader for FileSystemLoader {
    async fn load(&self) -> Result<String, ConfigError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::source_unavailable(self.path.display().to_string(), e))
    }

    fn coordinate(&self) -> SourceCoordinate {
        SourceCoordinate::File {
            path: self.path.clone()
        }
    }
}
