//! HTTP endpoint server using Axum

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::config::PipelineConfig;
use crate::core::pipeline::PipelineCoordinator;
use crate::error::CycleError;
use crate::metrics::Metrics;
use crate::models::series::Entity;
use crate::models::signal::SignalEvent;
use crate::signals::alerts::{DropAlert, PriceSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub pipeline: Arc<PipelineCoordinator>,
    pub config: PipelineConfig,
    /// Fixed universe; `None` lists the provider's markets per request
    pub universe: Option<Vec<Entity>>,
    /// Prices seen by the previous scan, for drop alerts
    pub snapshot: Arc<RwLock<PriceSnapshot>>,
}

impl AppState {
    pub fn new(
        metrics: Arc<Metrics>,
        pipeline: Arc<PipelineCoordinator>,
        config: PipelineConfig,
        universe: Option<Vec<Entity>>,
    ) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            pipeline,
            config,
            universe,
            snapshot: Arc::new(RwLock::new(PriceSnapshot::new())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "signalscan"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    pub min_score: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SignalResponse {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub count: usize,
    pub signals: Vec<SignalEvent>,
    pub alerts: Vec<DropAlert>,
}

/// Run a scan now and return the ranked signals
async fn scan_signals(
    State(state): State<AppState>,
    Query(params): Query<SignalQuery>,
) -> Result<Json<SignalResponse>, StatusCode> {
    let mut config = state.config.clone();
    if let Some(min_score) = params.min_score {
        config.min_score = min_score;
    }
    if let Some(limit) = params.limit {
        config.result_limit = limit;
    }

    let prior = state.snapshot.read().await.clone();
    let cycle = match state.universe {
        Some(ref fixed) => {
            state
                .pipeline
                .run_cycle_with_report(fixed, &config, &prior)
                .await
        }
        None => state.pipeline.run_discovered_cycle(&config, &prior).await,
    };
    let report = cycle
        .map_err(|e| match e {
            CycleError::Config(e) => {
                info!(error = %e, "Rejected scan parameters");
                StatusCode::BAD_REQUEST
            }
            CycleError::Store(e) => {
                error!(error = %e, "Scan aborted by signal store");
                StatusCode::SERVICE_UNAVAILABLE
            }
        })?;

    *state.snapshot.write().await = report.snapshot;

    Ok(Json(SignalResponse {
        timestamp: report.started_at,
        count: report.signals.len(),
        signals: report.signals,
        alerts: report.alerts,
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/signals", get(scan_signals))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
