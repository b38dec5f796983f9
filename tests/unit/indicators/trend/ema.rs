//! Unit tests for EMA and SMA

use crate::support::{flat_then, samples_from_closes};
use signalscan::indicators::trend::{calculate_ema, calculate_ema_series, calculate_sma, calculate_sma_series};

fn reference_ema(closes: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::new();
    let mut prev = closes[0];
    for &c in closes {
        prev = alpha * c + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

#[test]
fn test_ema_insufficient_data() {
    let samples = samples_from_closes(&[1.0; 10]);
    assert!(calculate_ema(&samples, 20).is_none());
}

#[test]
fn test_ema_jump_after_flat_history() {
    let samples = samples_from_closes(&flat_then(110, 201.0));
    let series = calculate_ema_series(&samples, 100);

    assert_eq!(series.len(), 110);
    assert!((series[108] - 100.0).abs() < 1e-9);
    assert!((series[109] - 102.0).abs() < 1e-9, "got {}", series[109]);
}

#[test]
fn test_ema_matches_reference_loop() {
    let closes: Vec<f64> = (0..110)
        .map(|i| 100.0 + (i as f64 * 0.37).sin() * 8.0 + i as f64 * 0.05)
        .collect();
    let samples = samples_from_closes(&closes);

    let ours = calculate_ema_series(&samples, 100);
    let expected = reference_ema(&closes, 100);
    assert_eq!(ours.len(), 110);
    for (i, (a, b)) in ours.iter().zip(expected.iter()).enumerate() {
        assert!((a - b).abs() < 1e-9, "index {}: {} vs {}", i, a, b);
    }
}

#[test]
fn test_sma_trailing_window() {
    let samples = samples_from_closes(&flat_then(110, 201.0));
    let latest = calculate_sma(&samples, 100).unwrap();
    assert!((latest - 101.01).abs() < 1e-9, "got {}", latest);

    let series = calculate_sma_series(&samples, 100);
    assert!(series[98].is_none());
    assert!((series[99].unwrap() - 100.0).abs() < 1e-9);
}
