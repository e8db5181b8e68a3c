//! Validate command - parse a payload without starting a repository.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use config::{ConfigurationParser, ParserOptions, PayloadFormat};
use hc_core::ConfigurationRecord;
use std::path::PathBuf;

use crate::{output, ux_error};

#[derive(Args)]
pub struct ValidateArgs {
    /// Payload file to check
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Payload syntax: json or yaml (default: from the file extension)
    #[arg(long)]
    pub format: Option<PayloadFormat>,

    /// Reject entries with fields other than alias, defaultValue,
    /// description and metadata
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Cannot read {}", args.path.display()))?;

    let parser = ConfigurationParser::new(
        ParserOptions {
            fail_on_unknown_fields: args.strict,
            format: args.format
        }
        .detect_format(&args.path)
    );

    let path = args.path.display().to_string();
    let records = parser
        .parse(&text)
        .map_err(|e| ux_error::from_config_error(&e.with_source(path.clone())))?;

    if args.json {
        let report = serde_json::json!({
            "path": path,
            "format": parser.options().payload_format().to_string(),
            "entries": records.len(),
            "aliases": records.iter().map(|r| r.alias.as_str()).collect::<Vec<_>>()
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::success(&format!(
        "{} is valid: {} {}",
        path,
        records.len(),
        if records.len() == 1 { "entry" } else { "entries" }
    ));
    for duplicate in duplicate_aliases(&records) {
        output::warn(&format!(
            "alias {} appears more than once, the last entry wins",
            duplicate.yellow()
        ));
    }
    Ok(())
}

fn duplicate_aliases(records: &[ConfigurationRecord]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates: Vec<&str> = records
        .iter()
        .map(|r| r.alias.as_str())
        .filter(|alias| !seen.insert(*alias))
        .collect();
    duplicates.sort_unstable();
    duplicates.dedup();
    duplicates
}
