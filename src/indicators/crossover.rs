//! Crossover detection between close price and its moving average

use crate::common::math;
use crate::error::IndicatorError;
use crate::indicators::trend::moving_average_series;
use crate::models::indicators::{
    CrossoverSignal, IndicatorKind, IndicatorPoint, IndicatorReading, PriceStatus,
};
use crate::models::series::SeriesWindow;

/// Classify the move from `previous` to `current`.
///
/// Bull requires the close to be at or below the average before and
/// strictly above it now; bear is the mirror image.
pub fn classify_crossover(previous: &IndicatorPoint, current: &IndicatorPoint) -> CrossoverSignal {
    let (prev_close, prev_ind) = (previous.sample.close, previous.indicator_value);
    let (cur_close, cur_ind) = (current.sample.close, current.indicator_value);

    if prev_close <= prev_ind && cur_close > cur_ind {
        CrossoverSignal::BullCross
    } else if prev_close >= prev_ind && cur_close < cur_ind {
        CrossoverSignal::BearCross
    } else {
        CrossoverSignal::NonCross
    }
}

/// Stateless indicator evaluation over one window
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Evaluate the latest crossover for `window`.
    ///
    /// Needs at least `period + 1` samples so that both the previous and the
    /// current sample have a trailing average.
    pub fn evaluate(
        window: &SeriesWindow,
        period: usize,
        kind: IndicatorKind,
    ) -> Result<IndicatorReading, IndicatorError> {
        let required = period + 1;
        let available = window.len();
        if period == 0 || available < required {
            return Err(IndicatorError::InsufficientData {
                required,
                available,
            });
        }

        let series = moving_average_series(&window.samples, period, kind);
        let point = |i: usize| -> Result<IndicatorPoint, IndicatorError> {
            let indicator_value = series[i].ok_or(IndicatorError::InsufficientData {
                required,
                available,
            })?;
            Ok(IndicatorPoint {
                sample: window.samples[i],
                indicator_value,
            })
        };

        let previous = point(available - 2)?;
        let current = point(available - 1)?;
        let crossover = classify_crossover(&previous, &current);

        let status = if current.sample.close > current.indicator_value {
            PriceStatus::Above
        } else {
            PriceStatus::Below
        };
        let percent_diff = math::pct_change(current.indicator_value, current.sample.close);

        Ok(IndicatorReading {
            kind,
            period,
            previous,
            current,
            crossover,
            status,
            percent_diff,
        })
    }
}
