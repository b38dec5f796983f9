//! Postgres-backed signal history

use crate::config;
use crate::db::store::SignalStore;
use crate::error::StoreError;
use crate::models::series::Entity;
use crate::models::signal::SignalEvent;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

pub struct PostgresSignalStore {
    client: Arc<RwLock<Option<Client>>>,
}

impl PostgresSignalStore {
    /// Connect using `DATABASE_URL` and make sure the schema exists
    pub async fn new() -> Result<Self, StoreError> {
        Self::connect(&config::get_database_url()).await
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await.map_err(|e| {
            error!(error = %e, "Failed to connect to Postgres");
            StoreError::NotConnected
        })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Postgres connection error");
            }
        });

        let store = Self {
            client: Arc::new(RwLock::new(Some(client))),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let client = self.client.read().await;
        let c = client.as_ref().ok_or(StoreError::NotConnected)?;

        c.batch_execute(
            "CREATE TABLE IF NOT EXISTS signals (
                entity TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                change_pct DOUBLE PRECISION NOT NULL,
                volume DOUBLE PRECISION NOT NULL,
                score DOUBLE PRECISION NOT NULL,
                crossover TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS signals_entity_timestamp
                ON signals (entity, timestamp DESC);",
        )
        .await?;

        Ok(())
    }

    /// Check if the connection is still usable
    pub async fn is_available(&self) -> bool {
        let client = self.client.read().await;
        client.as_ref().is_some_and(|c| !c.is_closed())
    }
}

const INSERT_SIGNAL: &str = "INSERT INTO signals (entity, timestamp, price, change_pct, volume, score, crossover)
     VALUES ($1, $2, $3, $4, $5, $6, $7)";

#[async_trait::async_trait]
impl SignalStore for PostgresSignalStore {
    async fn count_recent(&self, entity: &Entity, limit: usize) -> Result<u32, StoreError> {
        let client = self.client.read().await;
        let c = client.as_ref().ok_or(StoreError::NotConnected)?;

        let row = c
            .query_one(
                "SELECT COUNT(*) FROM (
                    SELECT 1 FROM signals
                    WHERE entity = $1
                    ORDER BY timestamp DESC
                    LIMIT $2
                 ) recent",
                &[&entity.as_str(), &(limit as i64)],
            )
            .await?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as u32)
    }

    async fn append(&self, event: &SignalEvent) -> Result<(), StoreError> {
        self.append_batch(std::slice::from_ref(event)).await
    }

    async fn append_batch(&self, events: &[SignalEvent]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut client = self.client.write().await;
        let c = client.as_mut().ok_or(StoreError::NotConnected)?;

        let tx = c.transaction().await?;
        let statement = tx.prepare(INSERT_SIGNAL).await?;
        for event in events {
            tx.execute(
                &statement,
                &[
                    &event.entity.as_str(),
                    &event.timestamp,
                    &event.price,
                    &event.change_pct,
                    &event.volume,
                    &event.score,
                    &event.crossover.as_str(),
                ],
            )
            .await?;
        }
        tx.commit().await?;

        debug!(count = events.len(), "PostgresSignalStore: appended {} signals", events.len());
        Ok(())
    }
}
