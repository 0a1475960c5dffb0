//! In-memory store: used when no database is configured, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::persistence::store::{PositionStore, StoreError};
use crate::types::position::{CASH_TICKER, Position};

pub struct MemoryStore {
    positions: RwLock<HashMap<String, Position>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
        }
    }

    /// Empty store seeded with a starting cash balance.
    pub fn with_cash(cash: f64) -> Self {
        let mut positions = HashMap::new();
        positions.insert(
            CASH_TICKER.to_string(),
            Position {
                ticker: CASH_TICKER.to_string(),
                quantity: cash,
                average_cost: None,
            },
        );
        Self {
            positions: RwLock::new(positions),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn read(&self, ticker: &str) -> Result<Option<Position>, StoreError> {
        let guard = self.positions.read().await;
        Ok(guard.get(ticker).cloned())
    }

    async fn write(
        &self,
        ticker: &str,
        quantity: f64,
        average_cost: Option<f64>,
    ) -> Result<(), StoreError> {
        let mut guard = self.positions.write().await;
        guard.insert(
            ticker.to_string(),
            Position {
                ticker: ticker.to_string(),
                quantity,
                average_cost,
            },
        );
        Ok(())
    }

    async fn delete(&self, ticker: &str) -> Result<(), StoreError> {
        let mut guard = self.positions.write().await;
        guard.remove(ticker);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Position>, StoreError> {
        let guard = self.positions.read().await;
        let mut positions: Vec<Position> = guard.values().cloned().collect();
        positions.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(positions)
    }
}
