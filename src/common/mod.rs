//! Shared numeric and time helpers

pub mod math;
pub mod time;
