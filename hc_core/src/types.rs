//! Core types: configuration records, snapshots and source coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

/// One configuration entry, identified by its alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRecord {
    /// Unique dotted key, e.g. `some.configuration.some.value`.
    pub alias: String,

    /// Untyped structured value; typed accessors decode it on demand.
    pub default_value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>
}

impl ConfigurationRecord {
    pub fn new(alias: impl Into<String>, default_value: Value) -> Self {
        Self {
            alias: alias.into(),
            default_value,
            description: None,
            metadata: BTreeMap::new()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Identifies the snapshot a reader is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVersion {
    /// 1 for the initial load, incremented on every publish.
    pub sequence: u64,

    /// SHA-256 hex digest of the raw payload the snapshot was parsed from.
    pub content_hash: String,

    pub loaded_at: DateTime<Utc>
}

impl SnapshotVersion {
    pub fn initial(content_hash: impl Into<String>) -> Self {
        Self {
            sequence: 1,
            content_hash: content_hash.into(),
            loaded_at: Utc::now()
        }
    }

    pub fn next(&self, content_hash: impl Into<String>) -> Self {
        Self {
            sequence: self.sequence + 1,
            content_hash: content_hash.into(),
            loaded_at: Utc::now()
        }
    }

    /// First characters of the content hash, for log lines.
    pub fn short_hash(&self) -> &str {
        let end = self.content_hash.len().min(12);
        &self.content_hash[..end]
    }
}

/// Immutable point-in-time mapping from alias to record.
///
/// Never mutated after construction: a refresh builds a new snapshot and
/// swaps the shared pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationSnapshot {
    entries: HashMap<String, Arc<ConfigurationRecord>>,
    version: SnapshotVersion
}

impl ConfigurationSnapshot {
    /// Build a snapshot from parsed records. When an alias appears more than
    /// once the last entry wins.
    pub fn from_records(records: Vec<ConfigurationRecord>, version: SnapshotVersion) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            let alias = record.alias.clone();
            if entries.insert(alias.clone(), Arc::new(record)).is_some() {
                tracing::warn!(alias = %alias, "Duplicate configuration alias, last entry wins");
            }
        }
        Self { entries, version }
    }

    pub fn empty(version: SnapshotVersion) -> Self {
        Self {
            entries: HashMap::new(),
            version
        }
    }

    pub fn get(&self, alias: &str) -> Option<&Arc<ConfigurationRecord>> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn version(&self) -> &SnapshotVersion {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Records sorted by alias.
    pub fn records(&self) -> Vec<Arc<ConfigurationRecord>> {
        let mut records: Vec<_> = self.entries.values().cloned().collect();
        records.sort_by(|a, b| a.alias.cmp(&b.alias));
        records
    }

    /// A copy of this snapshot with one entry replaced, under a new version.
    pub fn with_entry(&self, record: ConfigurationRecord, version: SnapshotVersion) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(record.alias.clone(), Arc::new(record));
        Self { entries, version }
    }
}

/// Where a configuration payload is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceCoordinate {
    File { path: PathBuf },
    ObjectStore { bucket: String, key: String },
    Memory { name: String }
}

impl std::fmt::Display for SourceCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { path } => write!(f, "{}", path.display()),
            Self::ObjectStore { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
            Self::Memory { name } => write!(f, "memory://{}", name)
        }
    }
}
