//! Signalscan: bounded-concurrency time-series ingestion, moving-average
//! crossover detection and composite scoring for a universe of entities.

pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use crate::config::PipelineConfig;
pub use crate::core::pipeline::{CycleReport, PipelineCoordinator};
pub use crate::error::{CycleError, FetchError, IndicatorError, ScoringError, StoreError};
pub use crate::models::{CrossoverSignal, Entity, Sample, SeriesWindow, SignalEvent};
