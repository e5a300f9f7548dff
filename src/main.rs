//! FluxVis - Main Entry Point
//!
//! Polls a tracker-data time series and keeps a consolidated in-memory
//! dataset, printing the per-device status table whenever a new snapshot
//! arrives.

use fluxvis_rs::{
    backend::{BackendMessage, InfluxSource, RangeFetcher, SyncBackend},
    config::AppConfig,
    views,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fluxvis_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FluxVis");

    let config = AppConfig::load_or_default();
    let fetcher = make_fetcher(&config)?;

    let (backend, frontend) = SyncBackend::new(&config, fetcher);
    let backend_handle = std::thread::spawn(move || backend.run());

    // Ctrl-C requests a clean shutdown; the worker finishes its cycle first
    let shutdown_tx = frontend.command_sender.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Shutting down...");
        let _ = shutdown_tx.send(fluxvis_rs::BackendCommand::Shutdown);
    })?;

    while let Some(msg) = frontend.recv() {
        match msg {
            BackendMessage::Snapshot(dataset) => {
                tracing::info!(
                    records = dataset.len(),
                    devices = dataset.devices().len(),
                    "new snapshot"
                );
                for row in views::summarize(&dataset) {
                    tracing::info!(
                        device = %row.device,
                        last_seen = %row.last_seen,
                        temperature = ?row.temperature,
                        battery = ?row.battery_voltage,
                        uptime_h = ?row.hours_uptime,
                        "status"
                    );
                }
            }
            BackendMessage::Stats(stats) => {
                tracing::debug!(
                    ok = stats.successful_fetches,
                    failed = stats.failed_fetches,
                    last_ms = stats.last_fetch_ms,
                    "fetch stats"
                );
            }
            BackendMessage::Shutdown => break,
        }
    }

    let _ = backend_handle.join();
    Ok(())
}

/// Pick the data source: the synthetic one when built with `mock-source`
/// and configured for it, otherwise live InfluxDB
fn make_fetcher(config: &AppConfig) -> anyhow::Result<Box<dyn RangeFetcher>> {
    #[cfg(feature = "mock-source")]
    if config.source.use_mock {
        tracing::info!("using mock data source");
        return Ok(Box::new(fluxvis_rs::backend::MockSource::new(
            config.sync.start_time,
            3,
            60,
        )));
    }

    let source = InfluxSource::new(config.source.clone(), config.sync.start_time)?;
    tracing::info!(source = %source.describe(), "using influxdb source");
    Ok(Box::new(source))
}
