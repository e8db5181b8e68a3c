pub mod dump;
pub mod get;
pub mod source;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hotconf",
    author,
    version,
    about = "hotconf - typed, hot-reloadable configuration",
    long_about = "Validate configuration payloads and inspect live repositories.\n\nThe repository \
                  is selected with --file, --settings, or the HOTCONF_* environment variables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Parse a payload file and report its entries")]
    Validate(validate::ValidateArgs),

    #[command(about = "Print the raw value stored under an alias")]
    Get(get::GetArgs),

    #[command(about = "Print every entry of the configured repository")]
    Dump(dump::DumpArgs),

    #[command(about = "Follow the repository and print each published version")]
    Watch(watch::WatchArgs)
}
