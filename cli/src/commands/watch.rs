//! Watch command - follow a live repository until Ctrl-C.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use config::{ConfigReloadEvent, SourceSettings, watch_repository};
use hc_core::ConfigurationRepository;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::source::{self, SourceArgs};
use crate::output;

#[derive(Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Refresh period in milliseconds (default: from settings, else 5000)
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Do not reload on file events, rely on the refresh schedule only
    #[arg(long)]
    pub no_file_events: bool
}

const DEFAULT_INTERVAL_MS: u64 = 5_000;

pub async fn run(args: WatchArgs) -> Result<()> {
    let mut settings = args.source.resolve()?;
    settings.refresh_interval_ms = match (args.interval_ms, settings.refresh_interval_ms) {
        (Some(ms), _) => ms,
        (None, 0) => DEFAULT_INTERVAL_MS,
        (None, ms) => ms
    };

    let repository = Arc::new(source::open(&settings).await?);
    let mut versions = repository.subscribe();

    output::header(&format!("Watching {}", repository.describe()));
    println!(
        "  {} every {} ms",
        "Refresh:".dimmed(),
        settings.refresh_interval_ms
    );
    print_version(&versions.borrow_and_update(), repository.snapshot().len());

    let mut file_events = match (&settings.source, args.no_file_events) {
        (SourceSettings::File { path }, false) => {
            Some(watch_repository(repository.clone(), path).await?)
        }
        _ => None
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                output::info("Interrupted, stopping");
                break;
            }
            changed = versions.changed() => {
                if changed.is_err() {
                    break;
                }
                let version = versions.borrow_and_update().clone();
                print_version(&version, repository.snapshot().len());
            }
            Some(event) = next_event(&mut file_events) => {
                report_event(event);
            }
        }
    }

    repository.shutdown();
    Ok(())
}

/// Pending forever when file events are disabled.
async fn next_event(events: &mut Option<mpsc::Receiver<ConfigReloadEvent>>) -> Option<ConfigReloadEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await
    }
}

fn print_version(version: &hc_core::SnapshotVersion, entries: usize) {
    println!(
        "{} {} ({} entries)",
        "published".green().bold(),
        output::version_line(version),
        entries
    );
}

fn report_event(event: ConfigReloadEvent) {
    match event {
        ConfigReloadEvent::Ready | ConfigReloadEvent::Reloaded(_) => {}
        ConfigReloadEvent::Unchanged(version) => {
            output::info(&format!("file touched, content unchanged at #{}", version.sequence));
        }
        ConfigReloadEvent::Removed(path) => {
            output::warn(&format!(
                "{} was removed, keeping the last snapshot",
                path.display()
            ));
        }
        ConfigReloadEvent::Error { path, error } => {
            output::warn(&format!(
                "reload of {} failed, keeping the last snapshot: {}",
                path.display(),
                error
            ));
        }
    }
}
