//! Scoring inputs and the emitted signal event

use crate::common::math;
use crate::models::indicators::CrossoverSignal;
use crate::models::series::{Entity, SeriesWindow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw per-entity observation fed to the scoring engine.
///
/// `None` means the provider had no reliable value for the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub entity: Entity,
    pub price: Option<f64>,
    pub change_pct: f64,
    /// Quote-currency turnover over the window
    pub volume: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl EntityMetrics {
    /// Derive metrics from a window: last close, first-open to last-close
    /// change, summed quote volume, and the window's high/low extremes.
    pub fn from_window(window: &SeriesWindow) -> Self {
        let first = window.samples.first();
        let last = window.samples.last();

        let price = last.map(|s| s.close);
        let change_pct = match (first, last) {
            (Some(f), Some(l)) => math::pct_change(f.open, l.close).unwrap_or(0.0),
            _ => 0.0,
        };
        let volume = if window.is_empty() {
            None
        } else {
            Some(window.samples.iter().map(|s| s.quote_volume()).sum())
        };
        let high = window
            .samples
            .iter()
            .map(|s| s.high)
            .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))));
        let low = window
            .samples
            .iter()
            .map(|s| s.low)
            .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.min(l))));

        Self {
            entity: window.entity.clone(),
            price,
            change_pct,
            volume,
            high,
            low,
        }
    }
}

/// Static market metadata for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub entity: Entity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_leverage: Option<f64>,
}

/// Sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub momentum: f64,
    pub volume_ratio: f64,
    pub volatility: f64,
    pub persistence: f64,
    pub leverage: f64,
}

/// Unit persisted to history and ranked for output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub entity: Entity,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub change_pct: f64,
    pub volume: f64,
    pub score: f64,
    pub crossover: CrossoverSignal,
}
