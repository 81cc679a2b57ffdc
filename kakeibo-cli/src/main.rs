//! kakeibo-cli - console front end for the recipe cost tracker

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kakeibo_cli::{execute, log_level, Cli};
use kakeibo_common::config::{open_store, resolve_root_folder, LoggingConfig, TomlConfig};
use kakeibo_common::memo::usage_memo;

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = TomlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    let root_folder = resolve_root_folder(cli.root_folder.as_deref(), &config);
    let backend = cli.backend.unwrap_or(config.storage.backend);

    let store = open_store(backend, &root_folder)
        .await
        .context("Failed to open store")?;
    let memo = usage_memo(config.memo.as_deref());

    execute(cli.command, store.as_ref(), memo).await
}

/// Initialize tracing from the `[logging]` section; `RUST_LOG` still wins
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level(logging)));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
