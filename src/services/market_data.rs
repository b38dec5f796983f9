//! Market data provider interface

use crate::error::FetchError;
use crate::models::series::{Entity, SeriesWindow};
use crate::models::signal::MarketInfo;

/// Source of per-entity time-series windows.
///
/// Calls are idempotent reads; implementations hold no per-call state.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the `window_size` most recent samples for `entity`, oldest first
    async fn fetch_window(&self, entity: &Entity, window_size: usize) -> Result<SeriesWindow, FetchError>;

    /// Market listing with static metadata. Empty when the provider has none.
    async fn load_markets(&self) -> Result<Vec<MarketInfo>, FetchError> {
        Ok(Vec::new())
    }
}
