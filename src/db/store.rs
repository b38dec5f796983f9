//! Signal history store interface

use crate::error::StoreError;
use crate::models::series::Entity;
use crate::models::signal::SignalEvent;

/// Append-only history of emitted signal events
#[async_trait::async_trait]
pub trait SignalStore: Send + Sync {
    /// Number of events for `entity` among its `limit` most recent ones
    async fn count_recent(&self, entity: &Entity, limit: usize) -> Result<u32, StoreError>;

    /// Append one event. History is never updated in place.
    async fn append(&self, event: &SignalEvent) -> Result<(), StoreError>;

    /// Append a cycle's events. Implementations backed by a database should
    /// make the whole batch visible at once.
    async fn append_batch(&self, events: &[SignalEvent]) -> Result<(), StoreError> {
        for event in events {
            self.append(event).await?;
        }
        Ok(())
    }
}
