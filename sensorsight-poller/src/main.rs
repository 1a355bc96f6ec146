//! HTTP sensor poller.
//!
//! Polls a sensor endpoint and logs normalized readings until Ctrl+C.

use anyhow::{Context, Result};
use clap::Parser;
use sensorsight_poller::display::DisplayFormatter;
use sensorsight_poller::notify::{Notifier, TracingSink};
use sensorsight_poller::render::LogRenderer;
use sensorsight_poller::{Fetch, HttpFetcher, Poller, PollerAppConfig, normalize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Polls an HTTP sensor endpoint and logs normalized readings.
#[derive(Parser, Debug)]
#[command(name = "sensorsight-poller")]
#[command(about = "Polls an HTTP sensor endpoint and logs normalized readings")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format). Defaults apply if it does not exist.
    #[arg(short, long, default_value = "sensorsight.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Override the sensor endpoint URL.
    #[arg(long)]
    url: Option<String>,

    /// Fetch once, print the reading as JSON and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config_found = args.config.exists();
    let mut config = if config_found {
        PollerAppConfig::load_from_file(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?
    } else {
        PollerAppConfig::default()
    };

    if let Some(url) = &args.url {
        config.poller.url = url.clone();
        config.validate().context("Invalid --url")?;
    }

    // Initialize logging
    let log_config = config.logging.clone().with_level_override(args.log_level.clone());
    sensorsight_common::init_tracing(&log_config)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    info!("Starting sensorsight-poller");
    if config_found {
        info!("Loaded configuration from {:?}", args.config);
    } else {
        warn!("Config file {:?} not found, using defaults", args.config);
    }

    let fetcher = HttpFetcher::from_config(&config.poller).context("Failed to create fetcher")?;

    if args.once {
        let json = fetcher
            .fetch()
            .await
            .with_context(|| format!("Failed to fetch {}", config.poller.url))?;
        let reading = normalize(&json, &config.poller);
        println!("{}", reading.to_json()?);
        return Ok(());
    }

    let renderer = LogRenderer::new(DisplayFormatter::from_config(
        &config.display,
        &config.poller,
    ));

    let mut poller = Poller::new(config.poller.clone(), fetcher, renderer);
    if config.notifications.enabled {
        poller = poller.with_notifier(Notifier::new(
            config.notifications.prefix.clone(),
            TracingSink,
        ));
    }

    let handle = poller.start();

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");

    handle.shutdown().await;
    info!("Sensor poller stopped");

    Ok(())
}
