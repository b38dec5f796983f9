//! Core application primitives (pipeline, scheduler, HTTP surface)

pub mod http;
pub mod pipeline;
pub mod scheduler;

pub use http::{create_router, start_server, AppState};
pub use pipeline::{filter_universe, CycleReport, CycleStage, EntityDiagnostic, PipelineCoordinator};
pub use scheduler::CycleScheduler;
