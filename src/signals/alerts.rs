//! Price drop alerts against the previous cycle

use crate::models::series::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last observed price per entity, handed from one cycle to the next
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    prices: BTreeMap<Entity, f64>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity, price: f64) {
        self.prices.insert(entity, price);
    }

    pub fn get(&self, entity: &Entity) -> Option<f64> {
        self.prices.get(entity).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Carry forward prices from `prior` for entities missing here
    pub fn merged_over(mut self, prior: &PriceSnapshot) -> Self {
        for (entity, price) in &prior.prices {
            self.prices.entry(entity.clone()).or_insert(*price);
        }
        self
    }
}

impl FromIterator<(Entity, f64)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (Entity, f64)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropAlert {
    pub entity: Entity,
    pub previous_price: f64,
    pub price: f64,
    /// Fall from the previous price, in percent (positive)
    pub drop_pct: f64,
}

/// Entities whose price fell by at least `threshold_pct` since `prior`.
/// Entities without a positive prior price never alert.
pub fn detect_drops(prior: &PriceSnapshot, current: &PriceSnapshot, threshold_pct: f64) -> Vec<DropAlert> {
    current
        .prices
        .iter()
        .filter_map(|(entity, &price)| {
            let previous_price = prior.get(entity).filter(|p| *p > 0.0)?;
            let drop_pct = (previous_price - price) / previous_price * 100.0;
            (drop_pct >= threshold_pct).then(|| DropAlert {
                entity: entity.clone(),
                previous_price,
                price,
                drop_pct,
            })
        })
        .collect()
}
