//! Unit tests for the scoring engine and ranking

use chrono::Utc;
use signalscan::db::{InMemorySignalStore, SignalStore};
use signalscan::error::ScoringError;
use signalscan::models::indicators::CrossoverSignal;
use signalscan::models::series::{Entity, Sample, SeriesWindow};
use signalscan::models::signal::{EntityMetrics, SignalEvent};
use signalscan::signals::{rank, ScoringEngine, ScoringInput};

fn metrics(entity: &str, price: f64, change_pct: f64, volume: f64, high: f64, low: f64) -> EntityMetrics {
    EntityMetrics {
        entity: Entity::new(entity),
        price: Some(price),
        change_pct,
        volume: Some(volume),
        high: Some(high),
        low: Some(low),
    }
}

fn event(entity: &str, score: f64) -> SignalEvent {
    SignalEvent {
        entity: Entity::new(entity),
        timestamp: Utc::now(),
        price: 1.0,
        change_pct: 0.0,
        volume: 1.0,
        score,
        crossover: CrossoverSignal::NonCross,
    }
}

fn input(m: EntityMetrics, max_leverage: Option<f64>) -> ScoringInput {
    ScoringInput {
        metrics: m,
        crossover: CrossoverSignal::BullCross,
        max_leverage,
    }
}

#[test]
fn test_reference_entity_scores_88() {
    let engine = ScoringEngine::new();
    let m = metrics("A", 100.0, 10.0, 200.0, 106.0, 95.0);
    let (components, score) = engine.score_entity(&m, 100.0, Some(3), Some(60.0)).unwrap();

    assert_eq!(components.momentum, 100.0);
    assert_eq!(components.volume_ratio, 70.0);
    assert_eq!(components.volatility, 70.0);
    assert_eq!(components.persistence, 100.0);
    assert_eq!(components.leverage, 100.0);
    assert_eq!(score, 88.0);
}

#[test]
fn test_volume_ratio_compares_quote_turnover() {
    // same quote turnover per bar, base volumes 800_000x apart
    let bars = |entity: &str, close: f64, base_volume: f64| {
        let samples = (0..3)
            .map(|i| Sample::new(i * 300_000, close, close, close, close, base_volume))
            .collect();
        EntityMetrics::from_window(&SeriesWindow::new(Entity::new(entity), samples))
    };
    let cheap = bars("CHEAPUSDT", 0.0625, 1_600_000.0);
    let btc = bars("BTCUSDT", 50_000.0, 2.0);
    assert_eq!(cheap.volume, Some(300_000.0));
    assert_eq!(btc.volume, Some(300_000.0));

    let engine = ScoringEngine::new();
    let avg = ScoringEngine::batch_average_volume([&cheap, &btc]);
    let (cheap_components, _) = engine.score_entity(&cheap, avg, None, None).unwrap();
    let (btc_components, _) = engine.score_entity(&btc, avg, None, None).unwrap();

    assert_eq!(cheap_components.volume_ratio, 70.0);
    assert_eq!(btc_components.volume_ratio, 70.0);
}

#[test]
fn test_wide_range_falls_into_top_volatility_band() {
    // range of 15% is above the 12% band
    let engine = ScoringEngine::new();
    let m = metrics("A", 100.0, 10.0, 200.0, 110.0, 95.0);
    let (components, score) = engine.score_entity(&m, 100.0, Some(3), Some(60.0)).unwrap();

    assert_eq!(components.volatility, 40.0);
    assert_eq!(score, 83.5);
}

#[test]
fn test_scoring_is_deterministic() {
    let engine = ScoringEngine::new();
    let m = metrics("A", 42.0, 7.3, 913.0, 44.0, 40.5);
    let first = engine.score_entity(&m, 500.0, Some(1), Some(20.0)).unwrap();
    for _ in 0..10 {
        assert_eq!(engine.score_entity(&m, 500.0, Some(1), Some(20.0)).unwrap(), first);
    }
}

#[test]
fn test_zero_price_or_volume_is_excluded() {
    let engine = ScoringEngine::new();
    let zero_price = metrics("A", 0.0, 10.0, 200.0, 106.0, 95.0);
    assert_eq!(
        engine.score_entity(&zero_price, 100.0, None, None).unwrap_err(),
        ScoringError::MissingRequiredField("price")
    );

    let zero_volume = metrics("B", 100.0, 10.0, 0.0, 106.0, 95.0);
    assert_eq!(
        engine.score_entity(&zero_volume, 100.0, None, None).unwrap_err(),
        ScoringError::MissingRequiredField("volume")
    );

    let missing = EntityMetrics {
        price: None,
        ..metrics("C", 1.0, 1.0, 1.0, 1.0, 1.0)
    };
    assert!(engine.score_entity(&missing, 100.0, None, None).is_err());
}

#[test]
fn test_rank_filters_sorts_and_truncates() {
    let ranked = rank(
        vec![event("A", 71.0), event("B", 90.0), event("C", 69.99), event("D", 80.0)],
        70.0,
        2,
    );
    let ids: Vec<&str> = ranked.iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(ids, vec!["B", "D"]);
}

#[test]
fn test_rank_breaks_ties_by_entity() {
    let ranked = rank(
        vec![event("ZEC", 75.0), event("ADA", 75.0), event("MKR", 75.0)],
        70.0,
        10,
    );
    let ids: Vec<&str> = ranked.iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(ids, vec!["ADA", "MKR", "ZEC"]);
}

#[test]
fn test_rank_keeps_exact_threshold() {
    assert_eq!(rank(vec![event("A", 70.0)], 70.0, 5).len(), 1);
}

#[tokio::test]
async fn test_batch_uses_average_of_survivors_and_stored_history() {
    let store = InMemorySignalStore::new();
    for _ in 0..3 {
        store.append(&event("A", 50.0)).await.unwrap();
    }

    let engine = ScoringEngine::new();
    let inputs = vec![
        input(metrics("A", 100.0, 10.0, 200.0, 106.0, 95.0), Some(60.0)),
        input(metrics("B", 10.0, 1.0, 50.0, 10.1, 9.9), None),
        input(metrics("C", 10.0, 1.0, 50.0, 10.1, 9.9), None),
        input(metrics("D", 0.0, 1.0, 50.0, 10.1, 9.9), None),
    ];

    let outcome = engine
        .score_batch(inputs, &store, Utc::now(), 70.0, 20)
        .await
        .unwrap();

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].0, Entity::new("D"));
    assert_eq!(outcome.scored.len(), 3);
    assert_eq!(outcome.ranked.len(), 1);
    assert_eq!(outcome.ranked[0].entity, Entity::new("A"));
    assert_eq!(outcome.ranked[0].score, 88.0);

    // every scored entity is appended, ranked or not
    assert_eq!(store.history(&Entity::new("A")).await.len(), 4);
    assert_eq!(store.history(&Entity::new("B")).await.len(), 1);
    assert!(store.history(&Entity::new("D")).await.is_empty());
}

#[tokio::test]
async fn test_persistence_grows_across_batches() {
    let store = InMemorySignalStore::new();
    let engine = ScoringEngine::new();

    let mut persistence = Vec::new();
    for _ in 0..5 {
        let outcome = engine
            .score_batch(
                vec![input(metrics("A", 100.0, 10.0, 200.0, 106.0, 95.0), Some(60.0))],
                &store,
                Utc::now(),
                0.0,
                20,
            )
            .await
            .unwrap();
        persistence.push(outcome.scored[0].components.persistence);
    }

    assert_eq!(persistence, vec![20.0, 40.0, 80.0, 100.0, 100.0]);
}
