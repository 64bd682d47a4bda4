use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use healthsweep::{Config, Monitor, Prober, ProviderClient, Ticker};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "healthsweep", about = "Periodic HTTP health-check monitor")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, short, env = "HEALTHSWEEP_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Pause between two sweeps in seconds.
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,

    /// Stop after this many sweeps.
    #[arg(long)]
    rounds: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let provider = ProviderClient::from_config(&config).context("building provider client")?;
    if let Some(provider) = &provider {
        if let Some(zone_id) = provider.zone_id() {
            match provider.zone(zone_id).await {
                Ok(zone) => info!(zone = %zone.name, id = %zone.id, "provider zone resolved"),
                Err(err) => warn!(zone_id, error = %err, "provider zone lookup failed"),
            }
        }
    }

    let config = config.resolve();
    let global = config.global();
    info!(
        timeout_ms = global.timeout_ms,
        retries = global.retries,
        retry_wait_ms = global.retry_wait_ms,
        entities = config.entities().len(),
        "global config"
    );

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shutdown.cancel();
        }
    });

    let prober = Prober::new().context("building HTTP client")?;
    let ticker = Ticker::new(Duration::from_secs(cli.interval_secs), cancel)
        .with_max_rounds(cli.rounds);
    Monitor::new(&config, prober).run(ticker).await;

    Ok(())
}
