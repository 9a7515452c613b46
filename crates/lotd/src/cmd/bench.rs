//! Bench command - RPC load test
//!
//! N concurrent connections issue M `getAvailability` calls each and the
//! latency distribution comes out on stdout.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::time::Instant;

use lotd_client::RpcClient;

/// Bench command arguments
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// RPC port
    #[arg(long, default_value_t = 5001)]
    pub port: u16,

    /// Concurrent connections
    #[arg(long, default_value_t = 10)]
    pub connections: usize,

    /// Requests per connection
    #[arg(long, default_value_t = 100)]
    pub requests: usize,

    /// Lot to query (defaults to the server's first lot)
    #[arg(long)]
    pub lot: Option<String>,
}

#[derive(Debug, Default)]
struct WorkerStats {
    latencies: Vec<Duration>,
    failures: u64,
}

/// Run the bench command
pub async fn run(args: BenchArgs) -> Result<()> {
    let addr = format!("{}:{}", args.host, args.port);

    // Resolve the target lot up front so workers measure only the hot call
    let lot_id = match &args.lot {
        Some(lot) => lot.clone(),
        None => {
            let mut client = RpcClient::connect(&addr)
                .await
                .with_context(|| format!("failed to connect to RPC server at {addr}"))?;
            let lots = client.get_lots().await.context("getLots failed")?;
            lots.first()
                .map(|lot| lot.id.clone())
                .context("server has no lots to query")?
        }
    };

    println!(
        "benchmarking getAvailability({lot_id}) against {addr}: {} connections x {} requests",
        args.connections, args.requests
    );

    let started = Instant::now();
    let mut workers = Vec::with_capacity(args.connections);

    for _ in 0..args.connections {
        let addr = addr.clone();
        let lot_id = lot_id.clone();
        let requests = args.requests;

        workers.push(tokio::spawn(async move {
            let mut stats = WorkerStats::default();
            let Ok(mut client) = RpcClient::connect(&addr).await else {
                stats.failures = requests as u64;
                return stats;
            };

            for _ in 0..requests {
                let sent = Instant::now();
                match client.get_availability(&lot_id).await {
                    Ok(_) => stats.latencies.push(sent.elapsed()),
                    Err(_) => stats.failures += 1,
                }
            }
            stats
        }));
    }

    let mut latencies: Vec<Duration> = Vec::with_capacity(args.connections * args.requests);
    let mut failures: u64 = 0;
    for worker in workers {
        let stats = worker.await.context("bench worker panicked")?;
        latencies.extend(stats.latencies);
        failures += stats.failures;
    }
    let elapsed = started.elapsed();

    print_summary(&mut latencies, failures, elapsed);
    Ok(())
}

fn print_summary(latencies: &mut [Duration], failures: u64, elapsed: Duration) {
    let total = latencies.len() as u64 + failures;
    let throughput = total as f64 / elapsed.as_secs_f64();

    println!();
    println!("duration:    {:.2}s", elapsed.as_secs_f64());
    println!("requests:    {total} ({} ok, {failures} failed)", latencies.len());
    println!("throughput:  {throughput:.0} req/s");

    if latencies.is_empty() {
        return;
    }
    latencies.sort_unstable();

    let mean = latencies.iter().sum::<Duration>() / latencies.len() as u32;
    println!("latency min: {:.3}ms", as_millis(latencies[0]));
    println!("latency avg: {:.3}ms", as_millis(mean));
    println!("latency p50: {:.3}ms", as_millis(percentile(latencies, 50.0)));
    println!("latency p95: {:.3}ms", as_millis(percentile(latencies, 95.0)));
    println!("latency p99: {:.3}ms", as_millis(percentile(latencies, 99.0)));
    println!(
        "latency max: {:.3}ms",
        as_millis(latencies[latencies.len() - 1])
    );
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let rank = ((p / 100.0) * (sorted.len() as f64 - 1.0)).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
