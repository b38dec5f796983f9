//! Composite scoring and signal ranking.

pub mod alerts;
pub mod buckets;
pub mod categories;
pub mod engine;
pub mod scoring;

pub use alerts::{detect_drops, DropAlert, PriceSnapshot};
pub use categories::ScoreWeights;
pub use engine::{rank, BatchOutcome, ScoredEntity, ScoringEngine, ScoringInput, PERSISTENCE_WINDOW};
pub use scoring::*;
