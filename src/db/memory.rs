//! In-process signal history, used when no database is configured and in tests

use crate::db::store::SignalStore;
use crate::error::StoreError;
use crate::models::series::Entity;
use crate::models::signal::SignalEvent;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySignalStore {
    events: RwLock<HashMap<Entity, Vec<SignalEvent>>>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored events for `entity`, oldest first
    pub async fn history(&self, entity: &Entity) -> Vec<SignalEvent> {
        let events = self.events.read().await;
        events.get(entity).cloned().unwrap_or_default()
    }

    pub async fn total(&self) -> usize {
        let events = self.events.read().await;
        events.values().map(Vec::len).sum()
    }
}

#[async_trait::async_trait]
impl SignalStore for InMemorySignalStore {
    async fn count_recent(&self, entity: &Entity, limit: usize) -> Result<u32, StoreError> {
        let events = self.events.read().await;
        let stored = events.get(entity).map_or(0, Vec::len);
        Ok(stored.min(limit) as u32)
    }

    async fn append(&self, event: &SignalEvent) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        events
            .entry(event.entity.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn append_batch(&self, batch: &[SignalEvent]) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        for event in batch {
            events
                .entry(event.entity.clone())
                .or_default()
                .push(event.clone());
        }
        Ok(())
    }
}
