//! Simulate command - synthetic sensor traffic
//!
//! Drives the sensor channel of a running server with random ±1 occupancy
//! deltas, the way a bank of real entry/exit sensors would.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::time::Instant;
use tracing::{debug, info};

use lotd_client::SensorClient;

/// Simulate command arguments
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Sensor port
    #[arg(long, default_value_t = 5002)]
    pub port: u16,

    /// Lots to update
    #[arg(long, value_delimiter = ',', default_value = "LOT-A,LOT-B,LOT-C,LOT-D")]
    pub lots: Vec<String>,

    /// Updates per second per lot
    #[arg(long, default_value_t = 1.0)]
    pub rate: f64,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 60)]
    pub duration: u64,
}

/// Run the simulate command
pub async fn run(args: SimulateArgs) -> Result<()> {
    let addr = format!("{}:{}", args.host, args.port);
    let mut client = SensorClient::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to sensor server at {addr}"))?;

    info!(
        server = %addr,
        lots = args.lots.len(),
        rate = args.rate,
        duration_secs = args.duration,
        "starting sensor simulation"
    );

    let started = Instant::now();
    let duration = Duration::from_secs(args.duration);
    let mut sent: u64 = 0;

    // Roll the dice ten times a second per lot so an average of `rate`
    // updates/sec/lot comes out
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let send_probability = (args.rate / 10.0).min(1.0);

    while started.elapsed() < duration {
        ticker.tick().await;
        for lot_id in &args.lots {
            if f64::from(rand::random::<f32>()) < send_probability {
                let delta = if rand::random::<bool>() { 1 } else { -1 };
                client
                    .send(lot_id, delta)
                    .await
                    .with_context(|| format!("update for {lot_id} failed"))?;
                sent += 1;
                debug!(lot_id = %lot_id, delta, "sent update");
            }
        }
    }

    info!(updates = sent, "simulation complete");
    Ok(())
}
