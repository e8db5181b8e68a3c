//! Repository selection shared by `get`, `dump` and `watch`.

use anyhow::Result;
use clap::Args;
use config::{
    RefreshingRepository, RepositoryFactory, RepositorySettings, load_settings_from_env,
    load_settings_from_file
};
use std::path::PathBuf;

use crate::ux_error;

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Payload file to read (overrides settings and environment)
    #[arg(long, value_name = "PATH", conflicts_with = "settings")]
    pub file: Option<PathBuf>,

    /// Repository settings file (.toml, .yaml or .yml)
    #[arg(long, value_name = "PATH", env = "HOTCONF_SETTINGS")]
    pub settings: Option<PathBuf>
}

impl SourceArgs {
    /// `--file`, then `--settings`, then `HOTCONF_*` variables.
    pub fn resolve(&self) -> Result<RepositorySettings> {
        if let Some(file) = &self.file {
            return Ok(RepositorySettings::file(file));
        }

        if let Some(path) = &self.settings {
            return load_settings_from_file(path).map_err(|e| {
                ux_error::invalid_settings(&e.to_string())
                    .fix(format!("Check {}", path.display()))
                    .into()
            });
        }

        load_settings_from_env().map_err(|e| ux_error::from_config_error(&e).into())
    }
}

/// Build the repository described by `settings`.
pub async fn open(settings: &RepositorySettings) -> Result<RefreshingRepository> {
    RepositoryFactory::build_refreshing(settings)
        .await
        .map_err(|e| ux_error::from_config_error(&e).into())
}

/// Build a repository for a single read: no refresh schedule.
pub async fn open_once(args: &SourceArgs) -> Result<RefreshingRepository> {
    let mut settings = args.resolve()?;
    settings.refresh_interval_ms = 0;
    open(&settings).await
}
