//! Civic Signal - Detection & Governance Engine
//!
//! HTTP service turning a municipal complaint stream into hotspot, spike
//! and trend signals with a governed alert lifecycle.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (./data, 0.0.0.0:8080)
//! cargo run --release
//!
//! # Run against a specific config file
//! cargo run --release -- --config /etc/civic-signal/engine.toml
//! ```
//!
//! # Environment Variables
//!
//! - `CIVIC_SIGNAL_CONFIG`: Path to the engine TOML config
//! - `CIVIC_SIGNAL_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use civic_signal::alerts::AlertManager;
use civic_signal::api::{create_app, EngineState};
use civic_signal::collaborators::{HttpClassifier, HttpEmbedder};
use civic_signal::config::{self, EngineConfig};
use civic_signal::store::{self, AlertStore, ComplaintStore};

#[derive(Parser, Debug)]
#[command(name = "civic-signal")]
#[command(about = "Civic Signal Detection & Governance Engine")]
#[command(version)]
struct CliArgs {
    /// Path to the engine TOML config (overrides CIVIC_SIGNAL_CONFIG)
    #[arg(long)]
    config: Option<String>,

    /// Override the server bind address (default from config: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the data directory (default from config: "./data")
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut engine_config = match &args.config {
        Some(path) => EngineConfig::load_from_file(std::path::Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => EngineConfig::load(),
    };
    if let Some(addr) = args.addr {
        engine_config.server.bind = addr;
    }
    if let Some(data_dir) = args.data_dir {
        engine_config.server.data_dir = data_dir;
    }
    let bind = engine_config.server.bind.clone();
    let data_dir = engine_config.server.data_dir.clone();
    let collaborators = engine_config.collaborators.clone();
    config::init(engine_config);

    let db = store::open_db(&data_dir)
        .with_context(|| format!("Failed to open database at {data_dir}"))?;
    let complaints = ComplaintStore::open(&db).context("Failed to open complaint store")?;
    let alert_store = AlertStore::open(&db).context("Failed to open alert store")?;
    info!(
        complaints = complaints.len(),
        alerts = alert_store.len(),
        "Stores opened"
    );

    let classifier = HttpClassifier::new(&collaborators.classifier_url, collaborators.timeout_secs)
        .context("Failed to build classification client")?;
    let embedder = HttpEmbedder::new(&collaborators.embedding_url, collaborators.timeout_secs)
        .context("Failed to build embedding client")?;

    let state = EngineState {
        manager: AlertManager::new(complaints.clone(), alert_store),
        complaints,
        classifier: Arc::new(classifier),
        embedder: Arc::new(embedder),
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    info!("HTTP server listening on {bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}
