//! Signal history stores

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemorySignalStore;
pub use postgres::PostgresSignalStore;
pub use store::SignalStore;
