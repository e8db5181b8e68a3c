//! In-memory configuration repository.
//!
//! The only backend that accepts writes; intended for tests and for
//! composing configuration in code.

use arc_swap::ArcSwap;
use errors::ConfigError;
use hc_core::{ConfigurationRecord, ConfigurationRepository, ConfigurationSnapshot, SnapshotVersion};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::parser::ConfigurationParser;

pub struct InMemoryConfigurationRepository {
    snapshot: ArcSwap<ConfigurationSnapshot>,
    version_tx: watch::Sender<SnapshotVersion>
}

impl InMemoryConfigurationRepository {
    pub const NAME: &'static str = "InMemoryConfigurationRepository";

    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    pub fn from_records(records: Vec<ConfigurationRecord>) -> Self {
        let version = SnapshotVersion::initial(content_hash(&records));
        let snapshot = ConfigurationSnapshot::from_records(records, version.clone());
        let (version_tx, _) = watch::channel(version);
        Self {
            snapshot: ArcSwap::from_pointee(snapshot),
            version_tx
        }
    }

    /// Build from a payload in the parser's format.
    pub fn from_payload(parser: &ConfigurationParser, text: &str) -> Result<Self, ConfigError> {
        let records = parser
            .parse(text)
            .map_err(|e| e.with_source(format!("memory://{}", Self::NAME)))?;
        Ok(Self::from_records(records))
    }

    pub fn version(&self) -> SnapshotVersion {
        self.snapshot.load().version().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SnapshotVersion> {
        self.version_tx.subscribe()
    }

    /// Insert or replace a whole record, keeping its description and
    /// metadata.
    pub fn put_record(&self, record: ConfigurationRecord) {
        let alias = record.alias.clone();
        self.snapshot.rcu(|current| {
            let mut entry = record.clone();
            if entry.description.is_none() {
                entry.description = current.get(&alias).and_then(|r| r.description.clone());
            }
            let hash = utils::compute_content_hash(&format!(
                "{}:{}:{}",
                current.version().content_hash,
                alias,
                entry.default_value
            ));
            let version = current.version().next(hash);
            Arc::new(current.with_entry(entry, version))
        });
        let version = self.version();
        debug!(alias = %alias, sequence = version.sequence, "Updated in-memory configuration");
        self.version_tx.send_replace(version);
    }
}

impl Default for InMemoryConfigurationRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn content_hash(records: &[ConfigurationRecord]) -> String {
    let text = serde_json::to_string(records).unwrap_or_default();
    utils::compute_content_hash(&text)
}

impl ConfigurationRepository for InMemoryConfigurationRepository {
    fn get(&self, alias: &str) -> Option<Arc<ConfigurationRecord>> {
        self.snapshot.load().get(alias).cloned()
    }

    fn put(&self, alias: &str, value: Value) -> Result<(), ConfigError> {
        if alias.trim().is_empty() {
            return Err(ConfigError::invalid_settings("alias must not be empty"));
        }
        let record = match self.get(alias) {
            Some(existing) => ConfigurationRecord {
                default_value: value,
                ..(*existing).clone()
            },
            None => ConfigurationRecord::new(alias, value)
        };
        self.put_record(record);
        Ok(())
    }

    fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
        self.snapshot.load_full()
    }

    fn describe(&self) -> String {
        Self::NAME.to_string()
    }
}

impl std::fmt::Debug for InMemoryConfigurationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryConfigurationRepository")
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_then_get() {
        let repo = InMemoryConfigurationRepository::new();
        assert!(repo.get("a.b").is_none());

        repo.put("a.b", json!(3)).unwrap();
        assert_eq!(repo.get("a.b").unwrap().default_value, json!(3));
        assert_eq!(repo.version().sequence, 2);

        repo.put("a.b", json!(4)).unwrap();
        assert_eq!(repo.get("a.b").unwrap().default_value, json!(4));
        assert_eq!(repo.version().sequence, 3);
    }

    #[test]
    fn test_put_keeps_description() {
        let repo = InMemoryConfigurationRepository::from_records(vec![
            ConfigurationRecord::new("limit", json!(1)).with_description("upper bound"),
        ]);
        repo.put("limit", json!(2)).unwrap();

        let record = repo.get("limit").unwrap();
        assert_eq!(record.default_value, json!(2));
        assert_eq!(record.description.as_deref(), Some("upper bound"));
    }

    #[test]
    fn test_put_does_not_affect_held_snapshot() {
        let repo = InMemoryConfigurationRepository::from_records(vec![ConfigurationRecord::new(
            "a",
            json!(1)
        )]);
        let held = repo.snapshot();
        repo.put("a", json!(2)).unwrap();

        assert_eq!(held.get("a").unwrap().default_value, json!(1));
        assert_eq!(repo.get("a").unwrap().default_value, json!(2));
    }

    #[test]
    fn test_put_notifies_subscribers() {
        let repo = InMemoryConfigurationRepository::new();
        let mut rx = repo.subscribe();
        repo.put("a", json!(true)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().sequence, 2);
    }

    #[test]
    fn test_empty_alias_rejected() {
        let repo = InMemoryConfigurationRepository::new();
        assert!(matches!(
            repo.put("", json!(1)),
            Err(ConfigError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_from_payload() {
        let repo = InMemoryConfigurationRepository::from_payload(
            &ConfigurationParser::default(),
            r#"[{"alias":"x","defaultValue":"y"}]"#
        )
        .unwrap();
        assert_eq!(repo.get("x").unwrap().default_value, json!("y"));

        let err = InMemoryConfigurationRepository::from_payload(
            &ConfigurationParser::default(),
            "not json"
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
