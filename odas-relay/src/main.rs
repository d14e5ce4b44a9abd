//! ODAS Relay - stream reassembly and fan-out for sound-source data
//!
//! Listens for ODAS tracking and potential-source TCP streams, rebuilds
//! message boundaries, and relays every message to the local UDP consumers.
//! Runs until the peer processes stop or Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use odas_relay::{
    LogObserver, Pipeline, PipelineConfig, RelayConfig, StandaloneMonitor, UdpRelay,
    CHANNEL_POTENTIAL, CHANNEL_TRACKING,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    info!("📡 Starting ODAS relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = RelayConfig::load()
        .context("Failed to load configuration")?;

    info!("📋 Configuration loaded from {}", config.config_path.display());

    // One UDP socket shared by every connection of both pipelines
    let relay = Arc::new(
        UdpRelay::new(&config.relay_host)
            .await
            .context("Failed to create UDP relay socket")?,
    );

    // Standalone wiring: notifications go to the log, and with no local
    // pipeline every source counts as remote.
    let observer = Arc::new(LogObserver);
    let monitor = Arc::new(StandaloneMonitor);

    let tracking = Pipeline::bind(
        PipelineConfig {
            name: "tracking".to_string(),
            listen_port: config.tracking.listen_port,
            relay_port: config.tracking.relay_port,
            channel: CHANNEL_TRACKING.to_string(),
            max_pending_bytes: config.max_pending_bytes,
        },
        relay.clone(),
        observer.clone(),
        monitor.clone(),
    )
    .await
    .context("Failed to bind tracking listener")?;

    let potential = Pipeline::bind(
        PipelineConfig {
            name: "potential".to_string(),
            listen_port: config.potential.listen_port,
            relay_port: config.potential.relay_port,
            channel: CHANNEL_POTENTIAL.to_string(),
            max_pending_bytes: config.max_pending_bytes,
        },
        relay,
        observer,
        monitor,
    )
    .await
    .context("Failed to bind potential listener")?;

    info!("🚀 ODAS relay ready");

    tokio::select! {
        result = tracking.run() => {
            if let Err(e) = result {
                error!("Tracking pipeline error: {}", e);
            }
        }
        result = potential.run() => {
            if let Err(e) = result {
                error!("Potential pipeline error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Received shutdown signal");
        }
    }

    info!("👋 ODAS relay stopped");
    Ok(())
}
