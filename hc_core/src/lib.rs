//! # hotconf Core
//!
//! Shared types and traits for the hotconf configuration system.
//!
//! This crate provides:
//! - Configuration records and immutable snapshots
//! - Source coordinates naming where a payload came from
//! - The repository, loader and decryptor traits every backend implements

pub mod traits;
pub mod types;

pub use traits::{ConfigurationRepository, PayloadDecryptor, RawLoader};
pub use types::{ConfigurationRecord, ConfigurationSnapshot, SnapshotVersion, SourceCoordinate};
