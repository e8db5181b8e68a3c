//! Get command - print one raw value.

use anyhow::Result;
use clap::Args;
use hc_core::ConfigurationRepository;

use super::source::{SourceArgs, open_once};
use crate::ux_error;

#[derive(Args)]
pub struct GetArgs {
    /// Dotted alias, e.g. some.configuration.value
    #[arg(value_name = "ALIAS")]
    pub alias: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the whole entry instead of just its value
    #[arg(long)]
    pub entry: bool
}

pub async fn run(args: GetArgs) -> Result<()> {
    let repository = open_once(&args.source).await?;

    let record = repository
        .get(&args.alias)
        .ok_or_else(|| ux_error::alias_not_found(&args.alias))?;

    if args.entry {
        println!("{}", serde_json::to_string_pretty(&*record)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&record.default_value)?);
    }
    Ok(())
}
