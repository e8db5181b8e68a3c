//! # Refreshing Repository
//!
//! Loader-backed configuration repository with periodic refresh.
//!
//! ```text
//! RawLoader::load ──▶ ConfigurationParser::parse ──▶ ConfigurationSnapshot
//!                                                        │ ArcSwap::store
//!                                                        ▼
//!                     get(alias) ◀── ArcSwap::load ── current snapshot
//! ```
//!
//! Construction performs one load before returning, so readers never see an
//! empty placeholder. With a nonzero refresh interval a tokio task reloads at
//! that fixed period; a failed reload is logged and the previous snapshot
//! stays live. At most one reload runs at a time: a scheduled tick that finds
//! one in flight is skipped, a manual [`RefreshingRepository::reload`] waits.

use arc_swap::ArcSwap;
use errors::ConfigError;
use hc_core::{
    ConfigurationRecord, ConfigurationRepository, ConfigurationSnapshot, RawLoader, SnapshotVersion
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::parser::ConfigurationParser;

/// Result of one reload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new snapshot was parsed and published.
    Published(SnapshotVersion),

    /// The payload hash matched the live snapshot; nothing was swapped.
    Unchanged(SnapshotVersion),

    /// A scheduled tick found another reload running.
    Skipped
}

struct Inner {
    name: &'static str,
    source: String,
    loader: Arc<dyn RawLoader>,
    parser: ConfigurationParser,
    snapshot: ArcSwap<ConfigurationSnapshot>,
    reload_lock: tokio::sync::Mutex<()>,
    version_tx: watch::Sender<SnapshotVersion>
}

impl Inner {
    /// Serialized reload. `wait` decides whether an in-flight reload is
    /// waited for or the call is skipped.
    async fn reload(&self, wait: bool) -> Result<ReloadOutcome, ConfigError> {
        let _guard = if wait {
            self.reload_lock.lock().await
        } else {
            match self.reload_lock.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    warn!(source = %self.source, "Reload already in progress, skipping tick");
                    return Ok(ReloadOutcome::Skipped);
                }
            }
        };

        debug!(source = %self.source, "Loading configurations");
        let text = self
            .loader
            .load()
            .await
            .map_err(|e| e.with_source(&self.source))?;
        let content_hash = utils::compute_content_hash(&text);

        let current = self.snapshot.load_full();
        if current.version().content_hash == content_hash {
            debug!(source = %self.source, "Configuration payload unchanged");
            self.record_outcome("unchanged");
            return Ok(ReloadOutcome::Unchanged(current.version().clone()));
        }

        let records = self
            .parser
            .parse(&text)
            .map_err(|e| e.with_source(&self.source))?;
        let version = current.version().next(content_hash);
        let snapshot = ConfigurationSnapshot::from_records(records, version.clone());
        let entries = snapshot.len();

        self.snapshot.store(Arc::new(snapshot));
        self.version_tx.send_replace(version.clone());

        info!(
            source = %self.source,
            sequence = version.sequence,
            hash = %version.short_hash(),
            entries,
            "Published configuration snapshot"
        );
        self.record_outcome("published");
        metrics::gauge!("hotconf_snapshot_entries", "source" => self.source.clone())
            .set(entries as f64);

        Ok(ReloadOutcome::Published(version))
    }

    /// Scheduled path: failures are logged and suppressed.
    async fn scheduled_reload(&self) {
        if let Err(e) = self.reload(false).await {
            self.record_outcome("failed");
            error!(
                source = %self.source,
                kind = e.kind(),
                error = %e,
                "Failed to refresh configuration, keeping previous snapshot"
            );
        }
    }

    fn record_outcome(&self, outcome: &'static str) {
        metrics::counter!(
            "hotconf_reload_total",
            "source" => self.source.clone(),
            "outcome" => outcome
        )
        .increment(1);
    }
}

struct RefreshTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>
}

/// Configuration repository backed by a [`RawLoader`].
///
/// Cheap, lock-free reads; the refresh task (if any) is cancelled by
/// [`RefreshingRepository::shutdown`] or on drop.
pub struct RefreshingRepository {
    inner: Arc<Inner>,
    refresh_interval: Duration,
    refresh_task: Mutex<Option<RefreshTask>>
}

impl RefreshingRepository {
    /// Load the initial snapshot and, for a nonzero `refresh_interval`,
    /// schedule periodic reloads. Must be called within a tokio runtime.
    ///
    /// Any load, decrypt or parse failure here is returned: a repository
    /// never starts without a successfully parsed snapshot.
    pub async fn start(
        name: &'static str,
        loader: Arc<dyn RawLoader>,
        parser: ConfigurationParser,
        refresh_interval: Duration
    ) -> Result<Self, ConfigError> {
        let source = loader.coordinate().to_string();

        debug!(source = %source, "Loading initial configurations");
        let text = loader.load().await.map_err(|e| e.with_source(&source))?;
        let records = parser.parse(&text).map_err(|e| e.with_source(&source))?;
        let version = SnapshotVersion::initial(utils::compute_content_hash(&text));
        let snapshot = ConfigurationSnapshot::from_records(records, version.clone());

        info!(
            repository = name,
            source = %source,
            entries = snapshot.len(),
            refresh_interval_ms = refresh_interval.as_millis() as u64,
            "Loaded initial configuration snapshot"
        );

        metrics::gauge!("hotconf_snapshot_entries", "source" => source.clone())
            .set(snapshot.len() as f64);

        let (version_tx, _) = watch::channel(version);
        let inner = Arc::new(Inner {
            name,
            source,
            loader,
            parser,
            snapshot: ArcSwap::from_pointee(snapshot),
            reload_lock: tokio::sync::Mutex::new(()),
            version_tx
        });

        let repository = Self {
            inner,
            refresh_interval,
            refresh_task: Mutex::new(None)
        };

        if !refresh_interval.is_zero() {
            repository.schedule_refresh();
        }

        Ok(repository)
    }

    fn schedule_refresh(&self) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        let period = self.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        inner.scheduled_reload().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!(source = %inner.source, "Configuration refresh stopped");
                            break;
                        }
                    }
                }
            }
        });

        if let Ok(mut task) = self.refresh_task.lock() {
            *task = Some(RefreshTask {
                shutdown_tx,
                handle
            });
        }
    }

    /// Run one reload now, waiting for any reload in flight. Unlike the
    /// scheduled path, errors are returned; the live snapshot is untouched on
    /// failure either way.
    #[tracing::instrument(skip(self), fields(source = %self.inner.source))]
    pub async fn reload(&self) -> Result<ReloadOutcome, ConfigError> {
        let result = self.inner.reload(true).await;
        if result.is_err() {
            self.inner.record_outcome("failed");
        }
        result
    }

    pub fn version(&self) -> SnapshotVersion {
        self.inner.snapshot.load().version().clone()
    }

    /// Receiver notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotVersion> {
        self.inner.version_tx.subscribe()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Whether a refresh schedule is still running.
    pub fn is_refreshing(&self) -> bool {
        self.refresh_task
            .lock()
            .map(|task| task.as_ref().is_some_and(|t| !t.handle.is_finished()))
            .unwrap_or(false)
    }

    /// Cancel the refresh schedule. Idempotent; the last snapshot stays
    /// readable.
    pub fn shutdown(&self) {
        let task = match self.refresh_task.lock() {
            Ok(mut task) => task.take(),
            Err(poisoned) => poisoned.into_inner().take()
        };

        if let Some(task) = task {
            let _ = task.shutdown_tx.send(true);
            task.handle.abort();
            info!(source = %self.inner.source, "Configuration refresh cancelled");
        }
    }
}

impl Drop for RefreshingRepository {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ConfigurationRepository for RefreshingRepository {
    fn get(&self, alias: &str) -> Option<Arc<ConfigurationRecord>> {
        self.inner.snapshot.load().get(alias).cloned()
    }

    fn put(&self, _alias: &str, _value: Value) -> Result<(), ConfigError> {
        Err(ConfigError::UnsupportedMutation {
            repository: self.inner.name.to_string()
        })
    }

    fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
        self.inner.snapshot.load_full()
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.inner.name, self.inner.source)
    }
}

impl std::fmt::Debug for RefreshingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshingRepository")
            .field("name", &self.inner.name)
            .field("source", &self.inner.source)
            .field("refresh_interval", &self.refresh_interval)
            .field("version", &self.version())
            .finish()
    }
}
