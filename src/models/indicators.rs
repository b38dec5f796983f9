use crate::models::series::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moving-average flavour used for crossover detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Sma,
    Ema,
}

impl FromStr for IndicatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(IndicatorKind::Sma),
            "ema" => Ok(IndicatorKind::Ema),
            other => Err(format!("unknown indicator kind '{}'", other)),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma => f.write_str("SMA"),
            IndicatorKind::Ema => f.write_str("EMA"),
        }
    }
}

/// Moving-average value aligned to one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub sample: Sample,
    pub indicator_value: f64,
}

/// Sign change between close price and its moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossoverSignal {
    BullCross,
    BearCross,
    NonCross,
}

impl CrossoverSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossoverSignal::BullCross => "BULL_CROSS",
            CrossoverSignal::BearCross => "BEAR_CROSS",
            CrossoverSignal::NonCross => "NON_CROSS",
        }
    }
}

impl FromStr for CrossoverSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BULL_CROSS" => Ok(CrossoverSignal::BullCross),
            "BEAR_CROSS" => Ok(CrossoverSignal::BearCross),
            "NON_CROSS" => Ok(CrossoverSignal::NonCross),
            other => Err(format!("unknown crossover '{}'", other)),
        }
    }
}

/// Where the latest close sits relative to the moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceStatus {
    Above,
    Below,
}

/// Result of evaluating one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub kind: IndicatorKind,
    pub period: usize,
    pub previous: IndicatorPoint,
    pub current: IndicatorPoint,
    pub crossover: CrossoverSignal,
    pub status: PriceStatus,
    /// Distance of the current close from the average, in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_diff: Option<f64>,
}
