use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;
pub mod ux_error;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Get(args) => commands::get::run(args).await,
        Commands::Dump(args) => commands::dump::run(args).await,
        Commands::Watch(args) => commands::watch::run(args).await
    };

    if let Err(e) = result {
        match e.downcast_ref::<ux_error::UxError>() {
            Some(ux) => ux.display(),
            None => output::error(&format!("{:#}", e))
        }
        std::process::exit(1);
    }
}
