//! Batch scoring, persistence, filtering and ranking

use crate::db::SignalStore;
use crate::error::{ScoringError, StoreError};
use crate::models::indicators::CrossoverSignal;
use crate::models::series::Entity;
use crate::models::signal::{EntityMetrics, ScoreComponents, SignalEvent};
use crate::signals::categories::ScoreWeights;
use crate::signals::scoring::{
    composite_score, leverage_score, momentum_score, persistence_score, volatility_score,
    volume_score,
};
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use std::cmp::Ordering;
use tracing::debug;

/// Number of most recent stored events inspected for persistence
pub const PERSISTENCE_WINDOW: usize = 3;

/// One entity entering the scoring stage
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub metrics: EntityMetrics,
    pub crossover: CrossoverSignal,
    pub max_leverage: Option<f64>,
}

/// A scored entity with its breakdown
#[derive(Debug, Clone)]
pub struct ScoredEntity {
    pub event: SignalEvent,
    pub components: ScoreComponents,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Filtered, sorted and truncated output
    pub ranked: Vec<SignalEvent>,
    /// Every entity that received a score (and was appended to the store)
    pub scored: Vec<ScoredEntity>,
    /// Entities excluded for lack of a reliable observation
    pub skipped: Vec<(Entity, ScoringError)>,
}

pub struct ScoringEngine {
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Reject observations without a usable price or volume
    pub fn check_required(metrics: &EntityMetrics) -> Result<(f64, f64), ScoringError> {
        let price = metrics
            .price
            .filter(|p| *p != 0.0 && p.is_finite())
            .ok_or(ScoringError::MissingRequiredField("price"))?;
        let volume = metrics
            .volume
            .filter(|v| *v != 0.0 && v.is_finite())
            .ok_or(ScoringError::MissingRequiredField("volume"))?;
        Ok((price, volume))
    }

    /// Mean volume over entities with a positive volume
    pub fn batch_average_volume<'a>(metrics: impl IntoIterator<Item = &'a EntityMetrics>) -> f64 {
        let volumes: Vec<f64> = metrics
            .into_iter()
            .filter_map(|m| m.volume)
            .filter(|v| *v > 0.0 && v.is_finite())
            .collect();
        crate::common::math::mean(&volumes).unwrap_or(0.0)
    }

    /// Score one entity. Pure: identical inputs give identical output.
    pub fn score_entity(
        &self,
        metrics: &EntityMetrics,
        avg_volume: f64,
        appearances: Option<u32>,
        max_leverage: Option<f64>,
    ) -> Result<(ScoreComponents, f64), ScoringError> {
        let (price, volume) = Self::check_required(metrics)?;

        let components = ScoreComponents {
            momentum: momentum_score(metrics.change_pct),
            volume_ratio: volume_score(volume, avg_volume),
            volatility: volatility_score(metrics.high, metrics.low, Some(price)),
            persistence: persistence_score(appearances),
            leverage: leverage_score(max_leverage),
        };
        let score = composite_score(&components, &self.weights);
        Ok((components, score))
    }

    /// Score a whole cycle's batch, append every scored event to `store` in
    /// one batch, then filter by `min_score` and rank.
    pub async fn score_batch(
        &self,
        inputs: Vec<ScoringInput>,
        store: &dyn SignalStore,
        timestamp: DateTime<Utc>,
        min_score: f64,
        limit: usize,
    ) -> Result<BatchOutcome, StoreError> {
        let mut outcome = BatchOutcome::default();
        let mut eligible = Vec::with_capacity(inputs.len());
        for input in inputs {
            match Self::check_required(&input.metrics) {
                Ok(_) => eligible.push(input),
                Err(e) => {
                    debug!(entity = %input.metrics.entity, reason = %e, "ScoringEngine: skipping {}", input.metrics.entity);
                    outcome.skipped.push((input.metrics.entity.clone(), e));
                }
            }
        }

        let avg_volume = Self::batch_average_volume(eligible.iter().map(|i| &i.metrics));

        let appearances = try_join_all(
            eligible
                .iter()
                .map(|input| store.count_recent(&input.metrics.entity, PERSISTENCE_WINDOW)),
        )
        .await?;

        for (input, appearances) in eligible.into_iter().zip(appearances) {
            let (components, score) = match self.score_entity(
                &input.metrics,
                avg_volume,
                Some(appearances),
                input.max_leverage,
            ) {
                Ok(scored) => scored,
                Err(e) => {
                    outcome.skipped.push((input.metrics.entity.clone(), e));
                    continue;
                }
            };

            let EntityMetrics {
                entity,
                price,
                change_pct,
                volume,
                ..
            } = input.metrics;
            outcome.scored.push(ScoredEntity {
                event: SignalEvent {
                    entity,
                    timestamp,
                    price: price.unwrap_or_default(),
                    change_pct,
                    volume: volume.unwrap_or_default(),
                    score,
                    crossover: input.crossover,
                },
                components,
            });
        }

        let events: Vec<SignalEvent> = outcome.scored.iter().map(|s| s.event.clone()).collect();
        store.append_batch(&events).await?;

        outcome.ranked = rank(events, min_score, limit);
        Ok(outcome)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep events with `score >= min_score`, highest first, ties by entity id
/// ascending, at most `limit` of them.
pub fn rank(mut events: Vec<SignalEvent>, min_score: f64, limit: usize) -> Vec<SignalEvent> {
    events.retain(|e| e.score >= min_score);
    events.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.entity.cmp(&b.entity))
    });
    events.truncate(limit);
    events
}
