//! Error taxonomy for the signal pipeline.
//!
//! Fetch, indicator and scoring errors are local to one entity and never
//! abort a cycle. Store and config errors are fatal and surface as
//! [`CycleError`].

use thiserror::Error;

/// Failure to obtain a usable window for one entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("fetch timed out after {0} ms")]
    Timeout(u64),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("window too short: {available} samples, {required} required")]
    ShortWindow { required: usize, available: usize },

    #[error("cancelled by cycle deadline")]
    Cancelled,
}

impl FetchError {
    /// Short label used for metrics and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Provider(_) => "provider",
            FetchError::MalformedPayload(_) => "malformed_payload",
            FetchError::ShortWindow { .. } => "short_window",
            FetchError::Cancelled => "cancelled",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("insufficient data: {available} samples, {required} required")]
    InsufficientData { required: usize, available: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
}

/// Persistence store failure. Always fatal for the cycle.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection unavailable")]
    NotConnected,

    #[error("store query failed: {0}")]
    Query(String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        if e.is_closed() {
            StoreError::NotConnected
        } else {
            StoreError::Query(e.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Cycle-level fatal error returned by the pipeline coordinator.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
