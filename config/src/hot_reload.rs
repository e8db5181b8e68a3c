//! # Configuration Hot Reload
//!
//! Watches a payload file and reloads its repository as soon as the file
//! changes, without waiting for the next scheduled refresh.

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::repository::{RefreshingRepository, ReloadOutcome};
use errors::ConfigError;
use hc_core::SnapshotVersion;

/// Configuration reload event.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigReloadEvent {
    /// The watcher is installed.
    Ready,

    /// The file changed and a new snapshot was published.
    Reloaded(SnapshotVersion),

    /// The file was touched but its content hash did not change.
    Unchanged(SnapshotVersion),

    /// The file was removed; the last snapshot stays live.
    Removed(PathBuf),

    /// Reload failed; the last snapshot stays live.
    Error { path: PathBuf, error: String }
}

/// Watch `path` and reload `repository` on every create or modify event.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Pushes file edits into the repository immediately. The periodic refresh
/// schedule, if any, keeps running alongside the watcher.
///
/// ## Usage
/// ```rust,no_run
/// use config::{ConfigReloadEvent, FileSystemRepositoryBuilder, watch_repository};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repository = Arc::new(
///         FileSystemRepositoryBuilder::new()
///             .file_name("config.json")
///             .build()
///             .await?
///     );
///     let mut rx = watch_repository(repository, "config.json").await?;
///
///     while let Some(event) = rx.recv().await {
///         if let ConfigReloadEvent::Reloaded(version) = event {
///             println!("Now at version {}", version.sequence);
///         }
///     }
///     Ok(())
/// }
/// ```
///
/// ## Behaviour
/// - The parent directory is watched, so editors that replace the file by
///   rename are picked up; events for other files are ignored
/// - Dropping the receiver stops the watcher
///
/// ## Errors
/// `SourceUnavailable` when the file does not exist.
pub async fn watch_repository(
    repository: Arc<RefreshingRepository>,
    path: impl AsRef<Path>
) -> Result<mpsc::Receiver<ConfigReloadEvent>, ConfigError> {
    let config_path = path.as_ref().to_path_buf();

    if !config_path.exists() {
        return Err(ConfigError::source_unavailable(
            config_path.display().to_string(),
            "file not found"
        ));
    }

    let file_name = config_path
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| ConfigError::invalid_settings("watched path has no file name"))?;
    let watch_dir = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from(".")
    };

    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let (event_tx, mut event_rx) = mpsc::channel(100);
        let mut watcher = match RecommendedWatcher::new(
            move |res| {
                let _ = event_tx.blocking_send(res);
            },
            notify::Config::default()
        ) {
            Ok(w) => w,
            Err(e) => {
                let error_msg = format!("Failed to create file watcher: {}", e);
                error!("{}", error_msg);
                let _ = tx
                    .send(ConfigReloadEvent::Error {
                        path: config_path,
                        error: error_msg
                    })
                    .await;
                return;
            }
        };

        if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
            let error_msg = format!("Failed to watch config directory: {}", e);
            error!("{}", error_msg);
            let _ = tx
                .send(ConfigReloadEvent::Error {
                    path: config_path,
                    error: error_msg
                })
                .await;
            return;
        }

        info!(path = %config_path.display(), "Watching configuration file");
        let _ = tx.send(ConfigReloadEvent::Ready).await;

        loop {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("Receiver dropped, stopping watcher for {:?}", config_path);
                    break;
                }
                event_result = event_rx.recv() => {
                    let Some(event_result) = event_result else {
                        break;
                    };

                    let event = match event_result {
                        Ok(event) => event,
                        Err(e) => {
                            warn!("Watch error: {}", e);
                            continue;
                        }
                    };

                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if !touches_file {
                        continue;
                    }

                    let reload_event = match event.kind {
                        EventKind::Create(_) | EventKind::Modify(_) => {
                            if !config_path.exists() {
                                continue;
                            }
                            match repository.reload().await {
                                Ok(ReloadOutcome::Published(version)) => {
                                    ConfigReloadEvent::Reloaded(version)
                                }
                                Ok(ReloadOutcome::Unchanged(version)) => {
                                    ConfigReloadEvent::Unchanged(version)
                                }
                                Ok(ReloadOutcome::Skipped) => continue,
                                Err(e) => {
                                    error!(
                                        path = %config_path.display(),
                                        error = %e,
                                        "Hot reload failed, keeping previous snapshot"
                                    );
                                    ConfigReloadEvent::Error {
                                        path: config_path.clone(),
                                        error: e.to_string()
                                    }
                                }
                            }
                        }
                        EventKind::Remove(_) => {
                            warn!(path = %config_path.display(), "Config file removed");
                            ConfigReloadEvent::Removed(config_path.clone())
                        }
                        _ => {
                            debug!("Ignoring event: {:?}", event.kind);
                            continue;
                        }
                    };

                    if let Err(e) = tx.send(reload_event).await {
                        error!("Failed to send config reload event: {}", e);
                        break;
                    }
                }
            }
        }
    });

    Ok(rx)
}
