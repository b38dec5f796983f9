//! Unit tests for sub-score bucket tables

use signalscan::models::signal::ScoreComponents;
use signalscan::signals::{
    composite_score, leverage_score, momentum_score, persistence_score, volatility_score,
    volume_score, ScoreWeights,
};

#[test]
fn test_momentum_bands() {
    assert_eq!(momentum_score(-3.0), 20.0);
    assert_eq!(momentum_score(4.99), 20.0);
    assert_eq!(momentum_score(5.0), 100.0);
    assert_eq!(momentum_score(15.0), 100.0);
    assert_eq!(momentum_score(25.0), 70.0);
    assert_eq!(momentum_score(25.01), 40.0);
}

#[test]
fn test_volume_ratio_bands() {
    assert_eq!(volume_score(50.0, 100.0), 30.0);
    assert_eq!(volume_score(100.0, 100.0), 70.0);
    assert_eq!(volume_score(200.0, 100.0), 70.0);
    assert_eq!(volume_score(500.0, 100.0), 100.0);
    assert_eq!(volume_score(600.0, 100.0), 80.0);
}

#[test]
fn test_volume_with_zero_average_is_neutral() {
    assert_eq!(volume_score(123.0, 0.0), 50.0);
}

#[test]
fn test_volatility_bands() {
    assert_eq!(volatility_score(Some(101.0), Some(100.0), Some(100.0)), 30.0);
    assert_eq!(volatility_score(Some(104.0), Some(100.0), Some(100.0)), 100.0);
    assert_eq!(volatility_score(Some(106.0), Some(95.0), Some(100.0)), 70.0);
    assert_eq!(volatility_score(Some(110.0), Some(95.0), Some(100.0)), 40.0);
}

#[test]
fn test_volatility_missing_or_zero_is_neutral() {
    assert_eq!(volatility_score(None, Some(95.0), Some(100.0)), 50.0);
    assert_eq!(volatility_score(Some(110.0), Some(0.0), Some(100.0)), 50.0);
    assert_eq!(volatility_score(Some(110.0), Some(95.0), None), 50.0);
}

#[test]
fn test_persistence_bands() {
    assert_eq!(persistence_score(None), 20.0);
    assert_eq!(persistence_score(Some(0)), 20.0);
    assert_eq!(persistence_score(Some(1)), 40.0);
    assert_eq!(persistence_score(Some(2)), 80.0);
    assert_eq!(persistence_score(Some(3)), 100.0);
}

#[test]
fn test_leverage_bands() {
    assert_eq!(leverage_score(None), 30.0);
    assert_eq!(leverage_score(Some(9.0)), 30.0);
    assert_eq!(leverage_score(Some(10.0)), 60.0);
    assert_eq!(leverage_score(Some(25.0)), 80.0);
    assert_eq!(leverage_score(Some(50.0)), 100.0);
}

#[test]
fn test_default_weights_sum_to_one() {
    assert!(ScoreWeights::default().verify());
}

#[test]
fn test_composite_is_rounded_to_cents() {
    let components = ScoreComponents {
        momentum: 100.0,
        volume_ratio: 70.0,
        volatility: 70.0,
        persistence: 100.0,
        leverage: 100.0,
    };
    assert_eq!(composite_score(&components, &ScoreWeights::default()), 88.0);

    let uneven = ScoreComponents {
        momentum: 33.333,
        ..components
    };
    let score = composite_score(&uneven, &ScoreWeights::default());
    assert_eq!(score, (score * 100.0).round() / 100.0);
}
