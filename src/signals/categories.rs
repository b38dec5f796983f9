//! Component weights for the composite score

use serde::{Deserialize, Serialize};

/// Weight of each sub-score in the final blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub momentum: f64,
    pub volume_ratio: f64,
    pub volatility: f64,
    pub persistence: f64,
    pub leverage: f64,
}

impl ScoreWeights {
    pub const MOMENTUM: f64 = 0.25;
    pub const VOLUME_RATIO: f64 = 0.25;
    pub const VOLATILITY: f64 = 0.15;
    pub const PERSISTENCE: f64 = 0.20;
    pub const LEVERAGE: f64 = 0.15;

    /// Verify weights sum to 1.0
    pub fn verify(&self) -> bool {
        (self.momentum + self.volume_ratio + self.volatility + self.persistence + self.leverage - 1.0)
            .abs()
            < 0.001
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            momentum: Self::MOMENTUM,
            volume_ratio: Self::VOLUME_RATIO,
            volatility: Self::VOLATILITY,
            persistence: Self::PERSISTENCE,
            leverage: Self::LEVERAGE,
        }
    }
}
