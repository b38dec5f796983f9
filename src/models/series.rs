//! Entities and their time-series windows

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier of one tracked item (instrument pair, route key)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(String);

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Entity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Entity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One OHLCV observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Period open time, milliseconds since epoch
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded quantity in base units
    pub volume: f64,
    /// Traded value in quote currency, when the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            turnover: None,
        }
    }

    pub fn with_turnover(mut self, turnover: f64) -> Self {
        self.turnover = Some(turnover);
        self
    }

    /// Quote-currency value traded in this period. Falls back to
    /// `close * volume` when no turnover was reported.
    pub fn quote_volume(&self) -> f64 {
        self.turnover.unwrap_or(self.close * self.volume)
    }
}

/// Ordered samples for one entity, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesWindow {
    pub entity: Entity,
    pub samples: Vec<Sample>,
}

impl SeriesWindow {
    pub fn new(entity: Entity, samples: Vec<Sample>) -> Self {
        Self { entity, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.close).collect()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Check that timestamps strictly increase and, when `period_ms` is
    /// given, are evenly spaced by it.
    pub fn validate(&self, period_ms: Option<i64>) -> Result<(), String> {
        for pair in self.samples.windows(2) {
            let (prev, cur) = (pair[0].timestamp, pair[1].timestamp);
            if cur <= prev {
                return Err(format!(
                    "timestamps not strictly increasing ({} then {})",
                    prev, cur
                ));
            }
            if let Some(period) = period_ms {
                if cur - prev != period {
                    return Err(format!(
                        "gap of {} ms between {} and {}, expected {} ms",
                        cur - prev,
                        prev,
                        cur,
                        period
                    ));
                }
            }
        }
        Ok(())
    }
}
