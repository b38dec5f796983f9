//! One full cycle: fetch, indicate, score, rank

use crate::config::PipelineConfig;
use crate::db::SignalStore;
use crate::error::CycleError;
use crate::indicators::IndicatorEngine;
use crate::metrics::Metrics;
use crate::models::indicators::IndicatorReading;
use crate::models::series::Entity;
use crate::models::signal::{EntityMetrics, MarketInfo, SignalEvent};
use crate::services::fetcher::FetchOrchestrator;
use crate::services::market_data::MarketDataProvider;
use crate::signals::alerts::{detect_drops, DropAlert, PriceSnapshot};
use crate::signals::engine::{ScoredEntity, ScoringEngine, ScoringInput};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Stage an entity was at when it dropped out of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStage {
    Fetching,
    Indicating,
    Scoring,
}

/// Why one entity is missing from a cycle's output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDiagnostic {
    pub entity: Entity,
    pub stage: CycleStage,
    pub reason: String,
}

/// Everything a cycle produced, beyond the ranked list
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    /// Ranked, filtered and truncated output
    pub signals: Vec<SignalEvent>,
    /// Every scored entity with its component breakdown
    pub scored: Vec<ScoredEntity>,
    pub readings: BTreeMap<Entity, IndicatorReading>,
    pub diagnostics: Vec<EntityDiagnostic>,
    /// Prices to hand to the next cycle for drop detection
    pub snapshot: PriceSnapshot,
    pub alerts: Vec<DropAlert>,
    pub deadline_hit: bool,
}

pub struct PipelineCoordinator {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn SignalStore>,
    scoring: ScoringEngine,
    metrics: Option<Arc<Metrics>>,
}

impl PipelineCoordinator {
    pub fn new(provider: Arc<dyn MarketDataProvider>, store: Arc<dyn SignalStore>) -> Self {
        Self {
            provider,
            store,
            scoring: ScoringEngine::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringEngine) -> Self {
        self.scoring = scoring;
        self
    }

    /// All listed markets passing the quote filter, sorted
    pub async fn discover_universe(&self, config: &PipelineConfig) -> Vec<Entity> {
        let markets = self.list_markets(config).await.unwrap_or_default();
        universe_from_markets(&markets, config.quote_filter.as_deref())
    }

    /// Run one cycle over every listed market.
    ///
    /// The listing is fetched once and supplies both the universe and the
    /// leverage table. Its duration counts against the cycle deadline.
    pub async fn run_discovered_cycle(
        &self,
        config: &PipelineConfig,
        prior: &PriceSnapshot,
    ) -> Result<CycleReport, CycleError> {
        config.validate()?;

        let listing_started = Instant::now();
        let markets = self.list_markets(config).await;
        let remaining = config.cycle_deadline.saturating_sub(listing_started.elapsed());

        let universe = universe_from_markets(
            markets.as_deref().unwrap_or_default(),
            config.quote_filter.as_deref(),
        );
        let leverage = leverage_table(markets.unwrap_or_default());
        self.execute(&universe, config, prior, Some(leverage), remaining)
            .await
    }

    /// Run one cycle and return the ranked signals
    pub async fn run_cycle(
        &self,
        entities: &[Entity],
        config: &PipelineConfig,
    ) -> Result<Vec<SignalEvent>, CycleError> {
        let report = self
            .run_cycle_with_report(entities, config, &PriceSnapshot::new())
            .await?;
        Ok(report.signals)
    }

    /// Run one cycle, comparing prices against `prior` for drop alerts
    pub async fn run_cycle_with_report(
        &self,
        entities: &[Entity],
        config: &PipelineConfig,
        prior: &PriceSnapshot,
    ) -> Result<CycleReport, CycleError> {
        config.validate()?;
        self.execute(entities, config, prior, None, config.cycle_deadline)
            .await
    }

    /// Fetch, indicate and score. When `leverage` is `None` the market
    /// listing is loaded alongside the fetches.
    async fn execute(
        &self,
        entities: &[Entity],
        config: &PipelineConfig,
        prior: &PriceSnapshot,
        leverage: Option<HashMap<Entity, Option<f64>>>,
        fetch_deadline: Duration,
    ) -> Result<CycleReport, CycleError> {
        let timer = Instant::now();
        let started_at = Utc::now();
        let universe = filter_universe(entities, config.quote_filter.as_deref());
        let mut diagnostics = Vec::new();

        info!(
            entities = universe.len(),
            concurrency = config.concurrency_limit,
            "PipelineCoordinator: starting cycle for {} entities",
            universe.len()
        );

        // Fetching
        let orchestrator = FetchOrchestrator::new(self.provider.clone(), config)
            .with_deadline(Some(fetch_deadline));
        let (leverage, fetched) = match leverage {
            Some(known) => (known, orchestrator.fetch_all(&universe).await),
            None => {
                let (markets, fetched) =
                    tokio::join!(self.list_markets(config), orchestrator.fetch_all(&universe));
                (leverage_table(markets.unwrap_or_default()), fetched)
            }
        };

        let mut windows = Vec::with_capacity(fetched.results.len());
        for (entity, result) in fetched.results {
            match result {
                Ok(window) => windows.push(window),
                Err(e) => {
                    if let Some(ref metrics) = self.metrics {
                        metrics.fetch_failures_total.inc();
                    }
                    diagnostics.push(EntityDiagnostic {
                        entity,
                        stage: CycleStage::Fetching,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Indicating
        let mut readings = BTreeMap::new();
        let mut inputs = Vec::with_capacity(windows.len());
        let mut current_prices = PriceSnapshot::new();
        for window in &windows {
            if let Some(last) = window.last() {
                current_prices.insert(window.entity.clone(), last.close);
            }
            match IndicatorEngine::evaluate(window, config.indicator_period, config.indicator_kind) {
                Ok(reading) => {
                    inputs.push(ScoringInput {
                        metrics: EntityMetrics::from_window(window),
                        crossover: reading.crossover,
                        max_leverage: leverage.get(&window.entity).copied().flatten(),
                    });
                    readings.insert(window.entity.clone(), reading);
                }
                Err(e) => {
                    debug!(entity = %window.entity, error = %e, "PipelineCoordinator: skipping {}", window.entity);
                    diagnostics.push(EntityDiagnostic {
                        entity: window.entity.clone(),
                        stage: CycleStage::Indicating,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Scoring
        let outcome = self
            .scoring
            .score_batch(
                inputs,
                self.store.as_ref(),
                started_at,
                config.min_score,
                config.result_limit,
            )
            .await?;
        for (entity, e) in &outcome.skipped {
            readings.remove(entity);
            diagnostics.push(EntityDiagnostic {
                entity: entity.clone(),
                stage: CycleStage::Scoring,
                reason: e.to_string(),
            });
        }

        let alerts = detect_drops(prior, &current_prices, config.drop_alert_pct);
        for alert in &alerts {
            warn!(
                entity = %alert.entity,
                previous = alert.previous_price,
                price = alert.price,
                drop_pct = alert.drop_pct,
                "PipelineCoordinator: {} dropped {:.2}% since last cycle",
                alert.entity,
                alert.drop_pct
            );
        }

        let elapsed = timer.elapsed();
        if let Some(ref metrics) = self.metrics {
            metrics.cycles_total.inc();
            metrics.cycle_duration_seconds.observe(elapsed.as_secs_f64());
            metrics.entities_scored_total.inc_by(outcome.scored.len() as u64);
            metrics.signals_emitted_total.inc_by(outcome.ranked.len() as u64);
        }

        info!(
            fetched = windows.len(),
            scored = outcome.scored.len(),
            emitted = outcome.ranked.len(),
            dropped = diagnostics.len(),
            deadline_hit = fetched.deadline_hit,
            elapsed_ms = elapsed.as_millis() as u64,
            "PipelineCoordinator: cycle done, {} of {} entities above threshold",
            outcome.ranked.len(),
            universe.len()
        );

        Ok(CycleReport {
            started_at,
            signals: outcome.ranked,
            scored: outcome.scored,
            readings,
            diagnostics,
            snapshot: current_prices.merged_over(prior),
            alerts,
            deadline_hit: fetched.deadline_hit,
        })
    }

    /// One listing of the provider's markets, bounded by
    /// `min(fetch_timeout, cycle_deadline)`. `None` when it failed.
    async fn list_markets(&self, config: &PipelineConfig) -> Option<Vec<MarketInfo>> {
        let limit = config.fetch_timeout.min(config.cycle_deadline);
        match timeout(limit, self.provider.load_markets()).await {
            Ok(Ok(markets)) => Some(markets),
            Ok(Err(e)) => {
                warn!(error = %e, "PipelineCoordinator: market metadata unavailable, leverage unknown");
                None
            }
            Err(_) => {
                warn!("PipelineCoordinator: market metadata timed out, leverage unknown");
                None
            }
        }
    }
}

fn leverage_table(markets: Vec<MarketInfo>) -> HashMap<Entity, Option<f64>> {
    markets
        .into_iter()
        .map(|m| (m.entity, m.max_leverage))
        .collect()
}

/// Sorted, distinct market entities passing the quote filter
fn universe_from_markets(markets: &[MarketInfo], quote: Option<&str>) -> Vec<Entity> {
    let entities: Vec<Entity> = markets.iter().map(|m| m.entity.clone()).collect();
    let mut universe = filter_universe(&entities, quote);
    universe.sort();
    universe
}

/// Distinct entities matching the optional quote suffix, first occurrence order
pub fn filter_universe(entities: &[Entity], quote: Option<&str>) -> Vec<Entity> {
    let mut seen = std::collections::HashSet::new();
    entities
        .iter()
        .filter(|e| quote.map_or(true, |q| e.as_str().ends_with(q)))
        .filter(|e| seen.insert((*e).clone()))
        .cloned()
        .collect()
}
