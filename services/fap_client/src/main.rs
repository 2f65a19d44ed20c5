//! FAP client harness
//!
//! Associates, sends a series of random location reports from the test
//! area, then disassociates.
//!
//! Usage:
//!   fap-client --server 127.0.0.1:40123 --reports 5 --period 10
//!   fap-client --config config/fap.toml --json-logs

use anyhow::{bail, Context, Result};
use clap::Parser;
use fap_client::{ClientConfig, FapClient};
use fap_config::ClientSettings;
use fap_types::GpsFix;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level until the configuration has been read
const BOOTSTRAP_LOG_LEVEL: &str = "info";

/// Latitude range of the test area
const TEST_LATITUDE: std::ops::Range<f64> = 41.175590..41.180524;
/// Longitude range of the test area
const TEST_LONGITUDE: std::ops::Range<f64> = -8.601089..-8.594566;

#[derive(Parser, Debug)]
#[command(name = "fap-client")]
#[command(about = "FAP Management Protocol test client")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Controller address (host:port), overrides the configuration
    #[arg(short, long)]
    server: Option<String>,

    /// Number of location reports to send
    #[arg(short, long)]
    reports: Option<u32>,

    /// Seconds between location reports
    #[arg(short, long)]
    period: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = load_settings(&args)?;
    let level = log_level(&args, &settings);
    init_logging(level, args.json_logs || settings.logging.json)?;

    info!("Starting FAP client");

    let mut config = ClientConfig::from_settings(&settings).await?;
    if let Some(server) = &args.server {
        config.server = tokio::net::lookup_host(server.as_str())
            .await
            .with_context(|| format!("Cannot resolve server address {server}"))?
            .next()
            .with_context(|| format!("No address for {server}"))?;
    }
    let reports = args.reports.unwrap_or(settings.reporting.reports);
    let period = args
        .period
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.reporting.period());

    info!(
        server = %config.server,
        reports,
        period_secs = period.as_secs(),
        "Configuration loaded"
    );

    let client = FapClient::new(config);

    let failures = tokio::select! {
        failures = run(&client, reports, period) => failures,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
            1
        }
    };

    if let Err(e) = client.shutdown().await {
        warn!("Shutdown: {}", e);
    }

    if failures > 0 {
        error!(failures, "FAP client finished with failures");
        bail!("{failures} step(s) failed");
    }
    info!("FAP client finished");
    Ok(())
}

/// Run the associate / report / disassociate sequence, returning the failure count
async fn run(client: &FapClient, reports: u32, period: Duration) -> u32 {
    let mut failures = 0;

    match client.associate().await {
        Ok(()) => info!("Associated"),
        Err(e) => {
            error!(kind = ?e.kind(), "Association failed: {}", e);
            failures += 1;
        }
    }

    for n in 1..=reports {
        let fix = random_fix();
        if let Some(fix) = &fix {
            info!(report = n, "Reporting {}", fix);
        }
        match client.report_location(fix).await {
            Ok(()) => info!(report = n, "Location acknowledged"),
            Err(e) => {
                error!(report = n, kind = ?e.kind(), "Location report failed: {}", e);
                failures += 1;
            }
        }
        if n < reports {
            tokio::time::sleep(period).await;
        }
    }

    match client.disassociate().await {
        Ok(()) => info!("Disassociated"),
        Err(e) => {
            error!(kind = ?e.kind(), "Disassociation failed: {}", e);
            failures += 1;
        }
    }

    failures
}

/// Random fix inside the test area, stamped now
fn random_fix() -> Option<GpsFix> {
    let mut rng = rand::thread_rng();
    let latitude = rng.gen_range(TEST_LATITUDE);
    let longitude = rng.gen_range(TEST_LONGITUDE);
    match GpsFix::now(latitude, longitude, 0.0) {
        Ok(fix) => Some(fix),
        Err(e) => {
            warn!("Discarding generated fix: {}", e);
            None
        }
    }
}

/// Read the settings with a scoped subscriber at the command-line level, so
/// the loader's own diagnostics are not lost.
fn load_settings(args: &Args) -> Result<ClientSettings> {
    let filter = log_filter(args.log_level.as_deref().unwrap_or(BOOTSTRAP_LOG_LEVEL))?;
    let load = || ClientSettings::load(args.config.as_deref());

    let settings = if args.json_logs {
        let subscriber = tracing_subscriber::fmt().json().with_env_filter(filter).finish();
        tracing::subscriber::with_default(subscriber, load)?
    } else {
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        tracing::subscriber::with_default(subscriber, load)?
    };
    Ok(settings)
}

/// Command line wins over the configuration file
fn log_level<'a>(args: &'a Args, settings: &'a ClientSettings) -> &'a str {
    args.log_level
        .as_deref()
        .unwrap_or(settings.logging.level.as_str())
}

fn log_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level")
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = log_filter(level)?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    Ok(())
}
