pub mod bybit;
pub mod fetcher;
pub mod market_data;

pub use bybit::BybitRestClient;
pub use fetcher::{FetchOrchestrator, FetchOutcome};
pub use market_data::MarketDataProvider;
