//! First-match bucket tables for the component sub-scores

/// Upper edge of one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// value < edge
    Below(f64),
    /// value <= edge
    AtMost(f64),
}

impl Bound {
    fn contains(&self, value: f64) -> bool {
        match *self {
            Bound::Below(edge) => value < edge,
            Bound::AtMost(edge) => value <= edge,
        }
    }
}

/// Ordered `(bound, score)` bands, evaluated top to bottom.
/// Values past the last band (and NaN) get `fallback`.
#[derive(Debug, Clone, Copy)]
pub struct BucketTable {
    pub bands: &'static [(Bound, f64)],
    pub fallback: f64,
}

impl BucketTable {
    pub const fn new(bands: &'static [(Bound, f64)], fallback: f64) -> Self {
        Self { bands, fallback }
    }

    pub fn score(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .find(|(bound, _)| bound.contains(value))
            .map(|(_, score)| *score)
            .unwrap_or(self.fallback)
    }
}

/// `<5 → 20`, `[5,15] → 100`, `(15,25] → 70`, `>25 → 40`.
/// Extreme moves score below moderate ones.
pub const MOMENTUM: BucketTable = BucketTable::new(
    &[
        (Bound::Below(5.0), 20.0),
        (Bound::AtMost(15.0), 100.0),
        (Bound::AtMost(25.0), 70.0),
    ],
    40.0,
);

/// Volume / batch average: `<1 → 30`, `[1,2] → 70`, `(2,5] → 100`, `>5 → 80`
pub const VOLUME_RATIO: BucketTable = BucketTable::new(
    &[
        (Bound::Below(1.0), 30.0),
        (Bound::AtMost(2.0), 70.0),
        (Bound::AtMost(5.0), 100.0),
    ],
    80.0,
);

/// High-low range as % of price: `<2 → 30`, `[2,6] → 100`, `(6,12] → 70`, `>12 → 40`
pub const VOLATILITY: BucketTable = BucketTable::new(
    &[
        (Bound::Below(2.0), 30.0),
        (Bound::AtMost(6.0), 100.0),
        (Bound::AtMost(12.0), 70.0),
    ],
    40.0,
);

/// Appearances in the last 3 stored events: `0 → 20`, `1 → 40`, `2 → 80`, `>=3 → 100`
pub const PERSISTENCE: BucketTable = BucketTable::new(
    &[
        (Bound::Below(1.0), 20.0),
        (Bound::AtMost(1.0), 40.0),
        (Bound::AtMost(2.0), 80.0),
    ],
    100.0,
);

/// Max leverage: `<10 → 30`, `[10,25) → 60`, `[25,50) → 80`, `>=50 → 100`
pub const LEVERAGE: BucketTable = BucketTable::new(
    &[
        (Bound::Below(10.0), 30.0),
        (Bound::Below(25.0), 60.0),
        (Bound::Below(50.0), 80.0),
    ],
    100.0,
);
