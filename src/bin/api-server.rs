//! Signalscan API Server
//!
//! Serves health, metrics and on-demand scans over HTTP. Signal history goes
//! to Postgres when reachable, otherwise to an in-process store.

use dotenvy::dotenv;
use signalscan::config::{get_environment, get_symbols, PipelineConfig};
use signalscan::core::http::{start_server, AppState};
use signalscan::core::pipeline::PipelineCoordinator;
use signalscan::db::{InMemorySignalStore, PostgresSignalStore, SignalStore};
use signalscan::logging;
use signalscan::metrics::Metrics;
use signalscan::models::series::Entity;
use signalscan::services::bybit::BybitRestClient;
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let env = get_environment();
    info!("Starting Signalscan API Server");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let config = PipelineConfig::from_env()?;
    let metrics = Arc::new(Metrics::new()?);

    let store: Arc<dyn SignalStore> = match PostgresSignalStore::new().await {
        Ok(store) => {
            info!("Postgres connected for API server");
            metrics.store_connected.set(1.0);
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Postgres - signal history kept in memory");
            Arc::new(InMemorySignalStore::new())
        }
    };

    let provider = Arc::new(BybitRestClient::new(&config.interval, config.fetch_timeout)?);
    let pipeline = Arc::new(
        PipelineCoordinator::new(provider, store).with_metrics(metrics.clone()),
    );

    let universe = get_symbols().map(|symbols| symbols.into_iter().map(Entity::from).collect::<Vec<_>>());
    match universe {
        Some(ref u) => info!(entities = u.len(), "Scanning fixed universe of {} entities", u.len()),
        None => info!("Scanning every listed market"),
    }

    let state = AppState::new(metrics, pipeline, config, universe);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
