//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::models::series::Sample;

/// Trailing mean of closes, `None` until `period` samples are available
pub fn calculate_sma_series(samples: &[Sample], period: usize) -> Vec<Option<f64>> {
    let closes: Vec<f64> = samples.iter().map(|s| s.close).collect();
    math::sma_series(&closes, period)
}

/// Latest SMA value
pub fn calculate_sma(samples: &[Sample], period: usize) -> Option<f64> {
    calculate_sma_series(samples, period).last().copied().flatten()
}
