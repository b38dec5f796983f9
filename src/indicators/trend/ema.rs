//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::series::Sample;

/// EMA over the closes of the whole slice.
///
/// Seeded at the first close and run once across every sample, so adjacent
/// points share one smoothing history.
pub fn calculate_ema_series(samples: &[Sample], period: usize) -> Vec<f64> {
    let closes: Vec<f64> = samples.iter().map(|s| s.close).collect();
    math::ema_series(&closes, period)
}

/// Latest EMA value
pub fn calculate_ema(samples: &[Sample], period: usize) -> Option<f64> {
    if samples.len() < period {
        return None;
    }
    calculate_ema_series(samples, period).last().copied()
}
