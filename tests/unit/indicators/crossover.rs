//! Unit tests for crossover detection

use crate::support::{flat_then, window};
use signalscan::error::IndicatorError;
use signalscan::indicators::{classify_crossover, IndicatorEngine};
use signalscan::models::indicators::{CrossoverSignal, IndicatorKind, IndicatorPoint, PriceStatus};
use signalscan::models::series::Sample;

fn point(close: f64, indicator_value: f64) -> IndicatorPoint {
    IndicatorPoint {
        sample: Sample::new(0, close, close, close, close, 1.0),
        indicator_value,
    }
}

#[test]
fn test_window_shorter_than_period_plus_one() {
    let w = window("BTCUSDT", &[100.0; 100]);
    let result = IndicatorEngine::evaluate(&w, 100, IndicatorKind::Sma);
    assert_eq!(
        result.unwrap_err(),
        IndicatorError::InsufficientData {
            required: 101,
            available: 100
        }
    );
}

#[test]
fn test_zero_period_is_insufficient() {
    let w = window("BTCUSDT", &[100.0; 5]);
    assert!(IndicatorEngine::evaluate(&w, 0, IndicatorKind::Ema).is_err());
}

#[test]
fn test_ema_bull_cross_on_jump() {
    let w = window("BTCUSDT", &flat_then(110, 201.0));
    let reading = IndicatorEngine::evaluate(&w, 100, IndicatorKind::Ema).unwrap();

    assert_eq!(reading.crossover, CrossoverSignal::BullCross);
    assert!((reading.previous.indicator_value - 100.0).abs() < 1e-9);
    assert!((reading.current.indicator_value - 102.0).abs() < 1e-9);
    assert_eq!(reading.status, PriceStatus::Above);
    assert!(reading.percent_diff.unwrap() > 0.0);
}

#[test]
fn test_sma_bear_cross_on_drop() {
    let w = window("ETHUSDT", &flat_then(6, 90.0));
    let reading = IndicatorEngine::evaluate(&w, 5, IndicatorKind::Sma).unwrap();
    assert_eq!(reading.crossover, CrossoverSignal::BearCross);
    assert_eq!(reading.status, PriceStatus::Below);
}

#[test]
fn test_flat_series_is_non_cross() {
    let w = window("SOLUSDT", &[50.0; 12]);
    for kind in [IndicatorKind::Sma, IndicatorKind::Ema] {
        let reading = IndicatorEngine::evaluate(&w, 5, kind).unwrap();
        assert_eq!(reading.crossover, CrossoverSignal::NonCross);
    }
}

#[test]
fn test_classification_is_exhaustive_and_exclusive() {
    let values = [9.0, 10.0, 11.0];
    for &pc in &values {
        for &pi in &values {
            for &cc in &values {
                for &ci in &values {
                    let signal = classify_crossover(&point(pc, pi), &point(cc, ci));
                    let bull = pc <= pi && cc > ci;
                    let bear = pc >= pi && cc < ci;
                    assert!(!(bull && bear));
                    let expected = if bull {
                        CrossoverSignal::BullCross
                    } else if bear {
                        CrossoverSignal::BearCross
                    } else {
                        CrossoverSignal::NonCross
                    };
                    assert_eq!(signal, expected, "prev {}/{} cur {}/{}", pc, pi, cc, ci);
                }
            }
        }
    }
}

#[test]
fn test_staying_above_is_not_a_cross() {
    assert_eq!(
        classify_crossover(&point(12.0, 10.0), &point(13.0, 10.5)),
        CrossoverSignal::NonCross
    );
}
