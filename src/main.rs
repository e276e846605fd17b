mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use client_manager::{config, db, RegistryError};

use crate::cli::{Cli, Command};

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = config::init(cli.env_file.as_deref())?;

    // Initialize database connection
    let db = db::init(&config).await?;

    let result = commands::run(&db, cli.command.unwrap_or(Command::Demo)).await;

    // Release the pool whether or not the command succeeded
    db.close().await;

    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose).ok();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<RegistryError>()
                .map(RegistryError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
