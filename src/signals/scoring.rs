//! Component sub-scores and the weighted composite

use crate::common::math;
use crate::models::signal::ScoreComponents;
use crate::signals::buckets;
use crate::signals::categories::ScoreWeights;

/// Scores 24h-style percentage change; see [`buckets::MOMENTUM`]
pub fn momentum_score(change_pct: f64) -> f64 {
    buckets::MOMENTUM.score(change_pct)
}

/// Neutral 50 when there is no batch average to compare against
pub fn volume_score(volume: f64, avg_volume: f64) -> f64 {
    if avg_volume == 0.0 {
        return 50.0;
    }
    buckets::VOLUME_RATIO.score(volume / avg_volume)
}

/// Neutral 50 when any input is missing or zero
pub fn volatility_score(high: Option<f64>, low: Option<f64>, price: Option<f64>) -> f64 {
    match (high, low, price) {
        (Some(high), Some(low), Some(price)) if high != 0.0 && low != 0.0 && price != 0.0 => {
            let range_pct = (high - low) / price * 100.0;
            buckets::VOLATILITY.score(range_pct)
        }
        _ => 50.0,
    }
}

/// `None` (unknown history) scores like zero appearances
pub fn persistence_score(appearances: Option<u32>) -> f64 {
    buckets::PERSISTENCE.score(appearances.unwrap_or(0) as f64)
}

/// Unknown leverage scores as the lowest band
pub fn leverage_score(max_leverage: Option<f64>) -> f64 {
    buckets::LEVERAGE.score(max_leverage.unwrap_or(0.0))
}

/// Weighted blend rounded to 2 decimals
pub fn composite_score(components: &ScoreComponents, weights: &ScoreWeights) -> f64 {
    let raw = components.momentum * weights.momentum
        + components.volume_ratio * weights.volume_ratio
        + components.volatility * weights.volatility
        + components.persistence * weights.persistence
        + components.leverage * weights.leverage;
    math::round_to(raw, 2)
}
