//! Depth market maker - Entry Point

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use dmm_gateway::DynGateway;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Two-sided depth market maker for a single instrument
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    dmm_telemetry::init_logging()?;

    info!("Starting depth market maker v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > DMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("DMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = dmm_bot::AppConfig::from_file(&config_path)?;
    info!(
        venue = %config.gateway.venue,
        supports_edit = config.gateway.supports_edit,
        interval_ms = config.worker.interval_ms,
        "Configuration loaded"
    );

    if !config.gateway.is_paper() {
        bail!(
            "venue '{}' has no adapter in this build; use venue = \"paper\"",
            config.gateway.venue
        );
    }
    let gateway: DynGateway = Arc::new(dmm_bot::paper_gateway(&config));

    let orchestrator = dmm_bot::Orchestrator::new(gateway, config.pricing.clone());
    let stop = CancellationToken::new();
    let worker = dmm_bot::Worker::new(orchestrator, config.worker.clone(), stop.clone())?;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        stop.cancel();
    });

    match worker.run().await {
        Ok(stats) => {
            info!(cycles = stats.cycles(), quoted = stats.quoted(), "Stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Stopped on fatal error");
            Err(e.into())
        }
    }
}
