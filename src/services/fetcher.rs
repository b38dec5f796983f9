//! Bounded-concurrency window fetching across the entity universe

use crate::config::PipelineConfig;
use crate::error::FetchError;
use crate::models::series::{Entity, SeriesWindow};
use crate::services::market_data::MarketDataProvider;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, warn};

/// Per-entity fetch results for one cycle
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub results: BTreeMap<Entity, Result<SeriesWindow, FetchError>>,
    pub elapsed: Duration,
    /// True when the cycle deadline fired before every fetch finished
    pub deadline_hit: bool,
}

impl FetchOutcome {
    pub fn successes(&self) -> impl Iterator<Item = &SeriesWindow> {
        self.results.values().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Entity, &FetchError)> {
        self.results
            .iter()
            .filter_map(|(entity, r)| r.as_ref().err().map(|e| (entity, e)))
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }
}

/// Fans out one provider call per entity with at most `concurrency_limit`
/// calls in flight. Failures stay attached to their entity. No retries.
pub struct FetchOrchestrator {
    provider: Arc<dyn MarketDataProvider>,
    concurrency_limit: usize,
    fetch_timeout: Duration,
    cycle_deadline: Option<Duration>,
    window_size: usize,
    min_window_len: usize,
    period_ms: Option<i64>,
}

impl FetchOrchestrator {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            concurrency_limit: config.concurrency_limit.max(1),
            fetch_timeout: config.fetch_timeout,
            cycle_deadline: Some(config.cycle_deadline),
            window_size: config.window_size,
            min_window_len: config.min_window_len(),
            period_ms: config.interval_millis(),
        }
    }

    /// Override the overall deadline (`None` waits for every fetch)
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.cycle_deadline = deadline;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Fetch a window for every distinct entity.
    ///
    /// Returns once all fetches have completed or timed out, or when the
    /// cycle deadline fires; entities still pending at that point are
    /// reported as [`FetchError::Cancelled`] and their tasks aborted.
    pub async fn fetch_all(&self, entities: &[Entity]) -> FetchOutcome {
        let started = Instant::now();
        let deadline_at = self.cycle_deadline.map(|d| started + d);
        let universe: BTreeSet<Entity> = entities.iter().cloned().collect();

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut tasks = JoinSet::new();
        for entity in universe.iter().cloned() {
            let provider = self.provider.clone();
            let semaphore = semaphore.clone();
            let fetch_timeout = self.fetch_timeout;
            let window_size = self.window_size;
            let min_window_len = self.min_window_len;
            let period_ms = self.period_ms;

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        let result = fetch_one(
                            provider.as_ref(),
                            &entity,
                            window_size,
                            fetch_timeout,
                            min_window_len,
                            period_ms,
                        )
                        .await;
                        drop(permit);
                        result
                    }
                    Err(_) => Err(FetchError::Cancelled),
                };
                (entity, result)
            });
        }

        let mut outcome = FetchOutcome::default();
        loop {
            tokio::select! {
                biased;
                joined = tasks.join_next() => match joined {
                    Some(Ok((entity, result))) => {
                        if let Err(ref e) = result {
                            warn!(entity = %entity, error = %e, kind = e.kind(), "FetchOrchestrator: fetch failed for {}", entity);
                        }
                        outcome.results.insert(entity, result);
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "FetchOrchestrator: fetch task ended abnormally");
                    }
                    None => break,
                },
                _ = sleep_until(deadline_at.unwrap_or_else(Instant::now)), if deadline_at.is_some() => {
                    outcome.deadline_hit = true;
                    tasks.abort_all();
                    break;
                }
            }
        }

        for entity in universe {
            if !outcome.results.contains_key(&entity) {
                let error = if outcome.deadline_hit {
                    FetchError::Cancelled
                } else {
                    FetchError::Provider("fetch task aborted".to_string())
                };
                outcome.results.insert(entity, Err(error));
            }
        }

        outcome.elapsed = started.elapsed();
        debug!(
            total = outcome.results.len(),
            ok = outcome.success_count(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            deadline_hit = outcome.deadline_hit,
            "FetchOrchestrator: fetched {} of {} windows",
            outcome.success_count(),
            outcome.results.len()
        );
        outcome
    }
}

async fn fetch_one(
    provider: &dyn MarketDataProvider,
    entity: &Entity,
    window_size: usize,
    fetch_timeout: Duration,
    min_window_len: usize,
    period_ms: Option<i64>,
) -> Result<SeriesWindow, FetchError> {
    let window = timeout(fetch_timeout, provider.fetch_window(entity, window_size))
        .await
        .map_err(|_| FetchError::Timeout(fetch_timeout.as_millis() as u64))??;

    if window.entity != *entity {
        return Err(FetchError::MalformedPayload(format!(
            "window for {} returned for {}",
            window.entity, entity
        )));
    }
    if window.len() < min_window_len {
        return Err(FetchError::ShortWindow {
            required: min_window_len,
            available: window.len(),
        });
    }
    window.validate(period_ms).map_err(FetchError::MalformedPayload)?;

    Ok(window)
}
