//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod series;
pub mod signal;

pub use indicators::{CrossoverSignal, IndicatorKind, IndicatorPoint, IndicatorReading, PriceStatus};
pub use series::{Entity, Sample, SeriesWindow};
pub use signal::{EntityMetrics, MarketInfo, ScoreComponents, SignalEvent};
