//! Trend indicators: SMA, EMA

pub mod ema;
pub mod sma;

pub use ema::*;
pub use sma::*;

use crate::models::indicators::IndicatorKind;
use crate::models::series::Sample;

/// Moving-average series aligned to `samples`, `None` where undefined
pub fn moving_average_series(samples: &[Sample], period: usize, kind: IndicatorKind) -> Vec<Option<f64>> {
    match kind {
        IndicatorKind::Sma => calculate_sma_series(samples, period),
        IndicatorKind::Ema => calculate_ema_series(samples, period)
            .into_iter()
            .map(Some)
            .collect(),
    }
}
