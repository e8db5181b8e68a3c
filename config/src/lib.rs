//! # hotconf Configuration Repositories
//!
//! Periodically refreshed, atomically swapped configuration snapshots.
//!
//! This crate provides:
//! - The payload parser (JSON or YAML entry lists)
//! - [`RefreshingRepository`], the loader-backed core with scheduled reload
//! - Filesystem, S3 and in-memory backends
//! - File watching for immediate reload on edit
//! - Repository settings from TOML/YAML files or `HOTCONF_*` variables
//!
//! # Best Practices
//!
//! - Reads never block: the live snapshot sits behind an `ArcSwap`
//! - A failed refresh never replaces a good snapshot
//! - Uses `validator` crate for settings validation

pub mod factory;
pub mod file_loader;
pub mod file_repository;
pub mod hot_reload;
pub mod loader;
pub mod memory_repository;
pub mod parser;
pub mod repository;
pub mod s3_repository;
pub mod settings;

pub use factory::RepositoryFactory;
pub use file_loader::{
    SettingsFileError, load_settings_from_file, load_settings_from_toml, load_settings_from_yaml
};
pub use file_repository::{FILE_SYSTEM_REPOSITORY, FileSystemRepositoryBuilder};
pub use hot_reload::{ConfigReloadEvent, watch_repository};
pub use loader::load_settings_from_env;
pub use memory_repository::InMemoryConfigurationRepository;
pub use parser::{ConfigurationParser, ParserOptions, PayloadFormat};
pub use repository::{RefreshingRepository, ReloadOutcome};
pub use s3_repository::{S3_REPOSITORY, S3RepositoryBuilder};
pub use settings::{RepositorySettings, SourceSettings};
pub use validator::Validate;
