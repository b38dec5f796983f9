//! Signalscan Worker
//!
//! Runs a scan cycle every `SCAN_INTERVAL_SECONDS` and persists the scored
//! signals to Postgres. Can be run as a separate process from the API server.

use dotenvy::dotenv;
use signalscan::config::{get_environment, get_symbols, PipelineConfig};
use signalscan::core::pipeline::PipelineCoordinator;
use signalscan::core::scheduler::CycleScheduler;
use signalscan::db::{PostgresSignalStore, SignalStore};
use signalscan::logging;
use signalscan::metrics::Metrics;
use signalscan::models::series::Entity;
use signalscan::services::bybit::BybitRestClient;
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let scan_interval: u64 = env::var("SCAN_INTERVAL_SECONDS")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(300);

    let env = get_environment();
    info!("Starting Signalscan Worker");
    info!(environment = %env, "Environment");

    let config = PipelineConfig::from_env()?;
    info!(
        concurrency = config.concurrency_limit,
        period = config.indicator_period,
        kind = %config.indicator_kind,
        interval = %config.interval,
        "Pipeline: {} {} on {} samples, {} fetches in flight",
        config.indicator_kind,
        config.indicator_period,
        config.interval,
        config.concurrency_limit
    );

    let metrics = Arc::new(Metrics::new()?);

    info!("Initializing Postgres connection...");
    let store: Arc<dyn SignalStore> = match PostgresSignalStore::new().await {
        Ok(store) => {
            info!("Postgres connected");
            metrics.store_connected.set(1.0);
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Postgres");
            warn!("Worker requires Postgres for signal history - exiting");
            return Err(format!("Postgres connection required for worker: {}", e).into());
        }
    };

    let provider = Arc::new(BybitRestClient::new(&config.interval, config.fetch_timeout)?);
    let pipeline = Arc::new(PipelineCoordinator::new(provider, store).with_metrics(metrics));

    let universe = get_symbols().map(|symbols| symbols.into_iter().map(Entity::from).collect::<Vec<_>>());
    match universe {
        Some(ref u) => info!(symbols = ?u, "Symbols: {} configured", u.len()),
        None => info!("No SYMBOLS set - scanning every listed market"),
    }

    info!("Starting cycle scheduler...");
    let scheduler = CycleScheduler::new(pipeline, config, universe, scan_interval)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    scheduler.start().await;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down worker...");
    scheduler.stop().await;
    info!("Worker stopped");

    Ok(())
}
