// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tally - inspect and maintain a file-backed record store

mod commands;
mod config;
mod output;
mod store;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::Command;
use crate::config::Config;
use crate::store::Store;

/// Environment variable holding the log filter directive
const LOG_ENV: &str = "TALLY_LOG";

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Tally - versioned record collections on disk"
)]
struct Cli {
    /// Directory holding one JSON file per collection
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to ./tally.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print events emitted during the command to stderr, one JSON object per line
    #[arg(long, global = true)]
    show_events: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::resolve(cli.config.as_deref(), &cwd)?;
    let data_dir = config.data_dir(cli.data_dir.as_deref(), &cwd);
    let store = Store::open(&config, &data_dir)?;

    let result = commands::run(cli.command, &store).await;

    // Events are shown even when the command failed part way
    if cli.show_events {
        output::print_events(&store.bus().history(None));
    }
    output::print_json(&result?)
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
