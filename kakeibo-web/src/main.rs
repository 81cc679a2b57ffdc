//! kakeibo-web - HTTP service for the recipe cost tracker
//!
//! Startup sequence:
//! 1. Parse command line, load TOML bootstrap config
//! 2. Initialize tracing (config level, RUST_LOG overrides)
//! 3. Resolve root folder and open the configured store
//! 4. Serve the API until Ctrl+C / SIGTERM

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kakeibo_common::config::{open_store, resolve_root_folder, LoggingConfig, TomlConfig};
use kakeibo_common::memo::usage_memo;
use kakeibo_common::store::Backend;
use kakeibo_web::api::health::BuildInfo;
use kakeibo_web::{build_router, AppState};
use tokio::signal;
use tracing::info;

/// Command-line arguments for kakeibo-web
#[derive(Parser, Debug)]
#[command(name = "kakeibo-web")]
#[command(about = "Recipe cost tracker HTTP API")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "KAKEIBO_PORT")]
    port: Option<u16>,

    /// Folder holding the database or JSON files
    #[arg(short, long, env = "KAKEIBO_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long, env = "KAKEIBO_CONFIG")]
    config: Option<PathBuf>,

    /// Storage backend: sqlite, json or memory (overrides config file)
    #[arg(short, long)]
    backend: Option<Backend>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    let build = BuildInfo::CURRENT;
    info!(
        "Starting kakeibo-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        build.git_hash,
        build.timestamp,
        build.profile
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    std::fs::create_dir_all(&root_folder)
        .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;
    info!("Root folder: {}", root_folder.display());

    let backend = args.backend.unwrap_or(config.storage.backend);
    let store = open_store(backend, &root_folder)
        .await
        .context("Failed to open store")?;

    let memo = usage_memo(config.memo.as_deref()).to_string();
    let app = build_router(AppState::new(store, memo));

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("kakeibo-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber; RUST_LOG takes precedence over the config level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level_or("info")));

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
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
