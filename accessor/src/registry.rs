//! Table of every accessor method known to the process.

use errors::ConfigError;
use hc_core::ConfigurationSnapshot;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::decode::validate;
use crate::descriptor::TypeDescriptor;

/// Resolved metadata for one accessor method, computed once at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorDescriptor {
    pub interface: String,
    pub method: String,

    /// Repository key the method reads.
    pub alias: String,

    /// The method's full return type.
    pub declared: TypeDescriptor,

    /// Whether an absent value falls back to a declared literal rather than
    /// `None`.
    pub has_default: bool
}

/// `(interface, method) → AccessorDescriptor` for every constructed
/// interface.
///
/// Registering the same pair again returns the existing descriptor, so
/// interfaces can be constructed any number of times.
#[derive(Debug, Default)]
pub struct AccessorRegistry {
    entries: RwLock<HashMap<(String, String), Arc<AccessorDescriptor>>>
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, descriptor: AccessorDescriptor) -> Arc<AccessorDescriptor> {
        let key = (descriptor.interface.clone(), descriptor.method.clone());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries.get(&key) {
            if **existing == descriptor {
                return existing.clone();
            }
            warn!(
                interface = %descriptor.interface,
                method = %descriptor.method,
                "Accessor re-registered with a different declaration, replacing"
            );
        }

        if let Some(other) = entries
            .values()
            .find(|d| d.alias == descriptor.alias && d.declared != descriptor.declared)
        {
            warn!(
                alias = %descriptor.alias,
                declared = %descriptor.declared,
                other = %format!("{}::{}", other.interface, other.method),
                other_declared = %other.declared,
                "Alias is read with conflicting types"
            );
        }

        debug!(
            alias = %descriptor.alias,
            declared = %descriptor.declared,
            "Registered accessor"
        );
        let descriptor = Arc::new(descriptor);
        entries.insert(key, descriptor.clone());
        descriptor
    }

    pub fn lookup(&self, interface: &str, method: &str) -> Option<Arc<AccessorDescriptor>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(interface.to_string(), method.to_string()))
            .cloned()
    }

    /// Every accessor reading `alias`.
    pub fn by_alias(&self, alias: &str) -> Vec<Arc<AccessorDescriptor>> {
        let mut found: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|d| d.alias == alias)
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.interface, &a.method).cmp(&(&b.interface, &b.method)));
        found
    }

    /// All descriptors sorted by alias.
    pub fn descriptors(&self) -> Vec<Arc<AccessorDescriptor>> {
        let mut all: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.alias.cmp(&b.alias).then_with(|| a.method.cmp(&b.method)));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every registered alias present in `snapshot` against its
    /// declared type.
    ///
    /// Returns the number of values checked, or every mismatch found. Absent
    /// and `null` values are skipped.
    pub fn verify(&self, snapshot: &ConfigurationSnapshot) -> Result<usize, Vec<ConfigError>> {
        let mut checked = 0;
        let mut failures = Vec::new();

        for descriptor in self.descriptors() {
            let Some(record) = snapshot.get(&descriptor.alias) else {
                continue;
            };
            if record.default_value.is_null() {
                continue;
            }
            checked += 1;
            if let Err(mismatch) = validate(&record.default_value, &descriptor.declared, "$") {
                failures.push(mismatch.into_error(&descriptor.alias));
            }
        }

        if failures.is_empty() {
            Ok(checked)
        } else {
            Err(failures)
        }
    }
}
