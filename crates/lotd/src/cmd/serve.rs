//! Serve command - run the lotd server
//!
//! Wires the pieces together: lot store, subscription engine, update
//! pipeline, and the four listeners, then waits for SIGINT/SIGTERM and
//! shuts everything down through one cancellation token.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lotd_config::Config;
use lotd_ingest::UpdatePipeline;
use lotd_pubsub::SubscriptionEngine;
use lotd_server::{ListenAddrs, spawn_listeners};
use lotd_store::{ChangeListener, Lot, LotStore};

/// How long to wait for components during shutdown
const SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (defaults to configs/lotd.toml if not specified)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = load_config(args.config)?;
    config.validate().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        lots = config.lots.len(),
        "lotd starting"
    );

    run_server(config).await?;

    info!("lotd shutdown complete");
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            // User explicitly provided config path - must exist
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            info!(config = %path.display(), "using config file");
            Config::from_file(&path).context("failed to load configuration")
        }
        None => {
            let default_paths = [PathBuf::from("configs/lotd.toml"), PathBuf::from("lotd.toml")];
            for path in &default_paths {
                if path.exists() {
                    info!(config = %path.display(), "using config file");
                    return Config::from_file(path).context("failed to load configuration");
                }
            }
            anyhow::bail!(
                "no configuration found (looked for configs/lotd.toml, lotd.toml); \
                 pass --config or create one from configs/example.toml"
            )
        }
    }
}

/// Main server run loop
async fn run_server(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    // Build the lot table in configuration order
    let lots: Vec<Lot> = config
        .lots
        .iter()
        .map(|lot| Lot::new(&lot.id, lot.capacity, lot.occupied))
        .collect();
    let store = Arc::new(LotStore::new(lots, config.server.reservation_timeout));

    // Subscription engine receives every free-count change via the store's
    // listener hook
    let engine = Arc::new(SubscriptionEngine::new(
        Arc::clone(&store),
        config.pubsub.max_queue_size,
    ));
    store.set_listener(Arc::clone(&engine) as Arc<dyn ChangeListener>);

    // Update pipeline: bounded queue + worker pool
    let pipeline = UpdatePipeline::start(
        Arc::clone(&store),
        config.ingest.workers,
        config.ingest.queue_size,
        cancel.clone(),
    );

    let addrs = ListenAddrs {
        line: config.server.line_addr(),
        rpc: config.server.rpc_addr(),
        sensor: config.server.sensor_addr(),
        pubsub: config.server.pubsub_addr(),
    };
    let listeners = spawn_listeners(addrs, store, engine, pipeline.sender(), &cancel);

    info!(
        line = %config.server.line_addr(),
        rpc = %config.server.rpc_addr(),
        sensor = %config.server.sensor_addr(),
        pubsub = %config.server.pubsub_addr(),
        workers = config.ingest.workers,
        back_pressure = ?config.pubsub.back_pressure_policy,
        "lotd running"
    );

    wait_for_shutdown().await;

    info!("shutdown signal received, stopping server...");
    cancel.cancel();

    for task in listeners {
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!(error = %e, "listener error during shutdown"),
            Ok(Err(e)) => warn!(error = %e, "listener panicked during shutdown"),
            Err(_) => warn!("listener did not finish within timeout"),
        }
    }

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, pipeline.join())
        .await
        .is_err()
    {
        warn!("update workers did not finish within timeout");
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
