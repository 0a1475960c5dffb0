//! Position persistence: the portfolio table, one row per ticker.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::persistence::store::{PositionStore, StoreError};
use crate::types::position::Position;

#[derive(Debug, FromRow)]
struct PositionRow {
    ticker: String,
    quantity: f64,
    average_cost: Option<f64>,
}

impl From<PositionRow> for Position {
    fn from(row: PositionRow) -> Self {
        Position {
            ticker: row.ticker,
            quantity: row.quantity,
            average_cost: row.average_cost,
        }
    }
}

pub struct PgPositionStore {
    pool: PgPool,
}

impl PgPositionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PositionStore for PgPositionStore {
    async fn read(&self, ticker: &str) -> Result<Option<Position>, StoreError> {
        let row = sqlx::query_as::<_, PositionRow>(
            "SELECT ticker, quantity, average_cost FROM portfolio WHERE ticker = $1",
        )
        .bind(ticker)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Position::from))
    }

    /// Upsert a position (insert or update on conflict).
    async fn write(
        &self,
        ticker: &str,
        quantity: f64,
        average_cost: Option<f64>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO portfolio (ticker, quantity, average_cost) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (ticker) DO UPDATE SET quantity = $2, average_cost = $3",
        )
        .bind(ticker)
        .bind(quantity)
        .bind(average_cost)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, ticker: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM portfolio WHERE ticker = $1")
            .bind(ticker)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Position>, StoreError> {
        let rows = sqlx::query_as::<_, PositionRow>(
            "SELECT ticker, quantity, average_cost FROM portfolio ORDER BY ticker",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Position::from).collect())
    }
}
