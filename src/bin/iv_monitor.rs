//! IV Spike Monitor
//!
//! Runs the scanning loop against the simulated option chain until Ctrl-C
//! (or `--cycles` is reached), then prints the final statistics as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use iv_spike::prelude::*;

/// IV spike monitor command line interface
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spike threshold in percent (overrides config and IV_SPIKE_THRESHOLD)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Seconds between scans (overrides config and SCAN_INTERVAL)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Seed for the simulated feed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Skip the startup test notification
    #[arg(long, default_value = "false")]
    no_startup_test: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long, default_value = "false")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(threshold) = args.threshold {
        config.detector.threshold_percent = threshold;
    }
    if let Some(interval) = args.interval {
        config.scan.interval_secs = interval;
    }
    if args.seed.is_some() {
        config.feed.seed = args.seed;
    }
    if args.no_startup_test {
        config.notify.startup_test = false;
    }
    config.validate().context("invalid configuration")?;

    if args.print_config {
        println!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting IV Spike Notifier");
    tracing::info!(
        "Threshold {:.1}%, scanning {} symbols every {}s",
        config.detector.threshold_percent,
        config.feed.symbols.len(),
        config.scan.interval_secs
    );

    let feed = SimulatedFeed::new(config.feed.clone());
    let detector = SpikeDetector::with_config(config.detector.clone());
    let notifier = NotificationManager::from_config(&config.notify);

    let mut monitor = SpikeMonitor::new(feed, detector, notifier, config.scan.interval())
        .with_startup_test(config.notify.startup_test)
        .with_max_cycles(args.cycles);
    let handle = monitor.handle();

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl-C received, stopping after the current cycle");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                tracing::error!("Cannot listen for Ctrl-C: {}", e);
                // Keep the sender alive so the monitor is not stopped
                std::future::pending::<()>().await;
            }
        }
    });

    monitor.run(stop_rx).await;

    let stats = handle.get_stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    let recent = handle.get_recent_spikes(10);
    if !recent.is_empty() {
        println!("\nRecent spikes:");
        for alert in &recent {
            println!("  {}", alert);
        }
    }

    Ok(())
}
