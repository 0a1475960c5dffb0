//! Store contract the ledger runs against: records keyed by ticker.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::position::Position;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Record store keyed by ticker. `write` has upsert semantics: create the
/// row if absent, else update it.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn read(&self, ticker: &str) -> Result<Option<Position>, StoreError>;
    async fn write(
        &self,
        ticker: &str,
        quantity: f64,
        average_cost: Option<f64>,
    ) -> Result<(), StoreError>;
    async fn delete(&self, ticker: &str) -> Result<(), StoreError>;
    async fn list_all(&self) -> Result<Vec<Position>, StoreError>;
}
