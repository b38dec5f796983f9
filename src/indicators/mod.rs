pub mod crossover;
pub mod trend;

pub use crossover::{classify_crossover, IndicatorEngine};
