//! Dispatcher behind generated configuration interfaces.

use errors::ConfigError;
use hc_core::ConfigurationRepository;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::decode::decode_with;
use crate::descriptor::Describe;
use crate::registry::{AccessorDescriptor, AccessorRegistry};

/// Reads typed values from a repository on behalf of accessor interfaces.
///
/// Every call consults the repository's live snapshot; nothing read here is
/// cached. Cloning is cheap and clones share the registry.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Binds accessor interfaces to one [`ConfigurationRepository`]. Interfaces
/// declared with [`config_interface!`](crate::config_interface) register their
/// methods here and dispatch every call through [`ConfigAccessor::get`] or
/// [`ConfigAccessor::get_or`].
///
/// ## Usage
/// ```rust
/// use accessor::{ConfigAccessor, config_interface};
/// use config::InMemoryConfigurationRepository;
/// use hc_core::ConfigurationRepository;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// config_interface! {
///     pub struct Features in "features" {
///         fn dark_mode() -> bool = false;
///     }
/// }
///
/// let repo = Arc::new(InMemoryConfigurationRepository::new());
/// let features = Features::new(&ConfigAccessor::new(repo.clone()));
/// assert!(!features.dark_mode().unwrap());
///
/// repo.put("features.dark.mode", json!(true)).unwrap();
/// assert!(features.dark_mode().unwrap());
/// ```
///
/// ## Errors
/// A stored value that does not match the declared type is returned as
/// [`ConfigError::TypeMismatch`]; the fallback is only used when the alias is
/// absent or `null`.
#[derive(Clone)]
pub struct ConfigAccessor {
    repository: Arc<dyn ConfigurationRepository>,
    registry: Arc<AccessorRegistry>
}

impl ConfigAccessor {
    pub fn new(repository: Arc<dyn ConfigurationRepository>) -> Self {
        Self::with_registry(repository, Arc::new(AccessorRegistry::new()))
    }

    /// Share one registry across accessors bound to different repositories.
    pub fn with_registry(
        repository: Arc<dyn ConfigurationRepository>,
        registry: Arc<AccessorRegistry>
    ) -> Self {
        Self {
            repository,
            registry
        }
    }

    pub fn repository(&self) -> &Arc<dyn ConfigurationRepository> {
        &self.repository
    }

    pub fn registry(&self) -> &Arc<AccessorRegistry> {
        &self.registry
    }

    /// Compute and record the descriptor for one method returning `T`.
    ///
    /// The alias is `dotted(interface).dotted(method)`; `namespace` replaces
    /// the interface part when given.
    pub fn register<T: Describe>(
        &self,
        interface: &str,
        method: &str,
        namespace: Option<&str>,
        has_default: bool
    ) -> Arc<AccessorDescriptor> {
        let alias = utils::accessor_alias(namespace.unwrap_or(interface), method);
        self.registry.register(AccessorDescriptor {
            interface: interface.to_string(),
            method: method.to_string(),
            alias,
            declared: T::describe(),
            has_default
        })
    }

    /// Current value of `descriptor.alias`, `None` when absent or `null`.
    pub fn get<T: DeserializeOwned>(
        &self,
        descriptor: &AccessorDescriptor
    ) -> Result<Option<T>, ConfigError> {
        let Some(record) = self.repository.get(&descriptor.alias) else {
            trace!(alias = %descriptor.alias, "Configuration value absent");
            return Ok(None);
        };
        if record.default_value.is_null() {
            return Ok(None);
        }
        decode_with(&descriptor.alias, &record.default_value, &descriptor.declared).map(Some)
    }

    /// Current value of `descriptor.alias`, or `default()` when absent.
    pub fn get_or<T: DeserializeOwned>(
        &self,
        descriptor: &AccessorDescriptor,
        default: impl FnOnce() -> T
    ) -> Result<T, ConfigError> {
        Ok(self.get(descriptor)?.unwrap_or_else(default))
    }

    /// Startup check of every registered accessor against the current
    /// snapshot. See [`AccessorRegistry::verify`].
    pub fn verify(&self) -> Result<usize, Vec<ConfigError>> {
        self.registry.verify(&self.repository.snapshot())
    }
}

impl fmt::Debug for ConfigAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigAccessor")
            .field("repository", &self.repository.describe())
            .field("accessors", &self.registry.len())
            .finish()
    }
}
