//! Core traits for the hotconf configuration system

use crate::types::{ConfigurationRecord, ConfigurationSnapshot, SourceCoordinate};
use async_trait::async_trait;
use errors::ConfigError;
use serde_json::Value;
use std::sync::Arc;

/// Source of configuration consulted by typed accessors.
///
/// Reads must never block on a refresh in progress; implementations keep the
/// current snapshot behind an atomically swappable pointer.
pub trait ConfigurationRepository: Send + Sync {
    /// Point lookup against the current snapshot.
    fn get(&self, alias: &str) -> Option<Arc<ConfigurationRecord>>;

    /// Mutation entry point. Read-only backends return
    /// [`ConfigError::UnsupportedMutation`].
    fn put(&self, alias: &str, value: Value) -> Result<(), ConfigError>;

    /// The whole current snapshot.
    fn snapshot(&self) -> Arc<ConfigurationSnapshot>;

    /// Human-readable source description for logs and errors.
    fn describe(&self) -> String;
}

/// Fetches the raw payload from a backing store.
///
/// Stateless per call: no caching, no retries.
#[async_trait]
pub trait RawLoader: Send + Sync {
    async fn load(&self) -> Result<String, ConfigError>;

    fn coordinate(&self) -> SourceCoordinate;
}

/// Decrypts an at-rest payload before it is parsed.
#[async_trait]
pub trait PayloadDecryptor: Send + Sync {
    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, ConfigError>;
}

#[async_trait]
impl<T: RawLoader + ?Sized> RawLoader for Arc<T> {
    async fn load(&self) -> Result<String, ConfigError> {
        (**self).load().await
    }

    fn coordinate(&self) -> SourceCoordinate {
        (**self).coordinate()
    }
}

impl<T: ConfigurationRepository + ?Sized> ConfigurationRepository for Arc<T> {
    fn get(&self, alias: &str) -> Option<Arc<ConfigurationRecord>> {
        (**self).get(alias)
    }

    fn put(&self, alias: &str, value: Value) -> Result<(), ConfigError> {
        (**self).put(alias, value)
    }

    fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
        (**self).snapshot()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
