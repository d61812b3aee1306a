//! komori CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let log_file = run_log_file(&cli);
    init_logging(log_level, log_file.as_deref())?;

    // Execute command
    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args).await,
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{:#}", e), "komori exited with an error");
    }

    result
}

/// Only `run` writes a log file; other commands log to stderr only.
/// A config that fails to load falls back to the default log file so the
/// load error itself is recorded there.
fn run_log_file(cli: &Cli) -> Option<PathBuf> {
    let Commands::Run(args) = &cli.command else {
        return None;
    };

    if let Some(path) = &args.log_file {
        return Some(path.clone());
    }

    AppConfig::load(cli.config.as_deref())
        .unwrap_or_default()
        .general
        .log_file_path()
}

fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(())
}
