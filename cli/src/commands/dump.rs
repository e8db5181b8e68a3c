//! Dump command - print every entry of the current snapshot.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use hc_core::{ConfigurationRecord, ConfigurationRepository};
use std::sync::Arc;

use super::source::{SourceArgs, open_once};
use crate::output;

#[derive(Args)]
pub struct DumpArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output the entries as a JSON payload
    #[arg(long)]
    pub json: bool
}

pub async fn run(args: DumpArgs) -> Result<()> {
    let repository = open_once(&args.source).await?;
    let snapshot = repository.snapshot();
    let records = snapshot.records();

    if args.json {
        let entries: Vec<&ConfigurationRecord> = records.iter().map(Arc::as_ref).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    output::header(&repository.describe());
    println!(
        "  {} {}",
        "Version:".dimmed(),
        output::version_line(snapshot.version()).cyan()
    );
    println!("  {} {}", "Entries:".dimmed(), records.len());
    println!();

    for record in &records {
        println!("{}", format_entry(record));
    }
    Ok(())
}

fn format_entry(record: &ConfigurationRecord) -> String {
    let value = serde_json::to_string(&record.default_value)
        .unwrap_or_else(|_| record.default_value.to_string());
    match &record.description {
        Some(description) => format!(
            "{} = {}  {}",
            record.alias.bold(),
            value,
            format!("# {}", description).dimmed()
        ),
        None => format!("{} = {}", record.alias.bold(), value)
    }
}
