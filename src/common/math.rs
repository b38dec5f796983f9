//! Moving-average math over plain `f64` slices

/// Arithmetic mean, `None` on empty input
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Simple moving average aligned to the input.
///
/// Entry `i` is the mean of the `period` values ending at `i`, or `None`
/// while fewer than `period` values are available.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if period == 0 {
        out.resize(values.len(), None);
        return out;
    }

    for i in 0..values.len() {
        if i + 1 < period {
            out.push(None);
        } else {
            out.push(mean(&values[i + 1 - period..=i]));
        }
    }
    out
}

/// Exponential moving average aligned to the input, seeded at the first value.
///
/// `ema[i] = v[i] * k + ema[i-1] * (1 - k)` with `k = 2 / (period + 1)`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return out;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = first;
    out.push(prev);
    for &value in &values[1..] {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Percentage change from `from` to `to`; `None` when `from` is zero
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}
