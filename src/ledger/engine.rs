//! Trade execution: buy/sell against the position store with cash and
//! holdings checks, weighted average cost on buys.
//! Testable without HTTP.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::persistence::{PositionStore, StoreError};
use crate::types::position::{CASH_TICKER, Position};
use crate::types::trade::{TradeReceipt, TradeSide};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Requested quantity was zero, negative, or not a number.
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(f64),
    /// Ticker was empty or the reserved cash ticker.
    #[error("invalid ticker {0:?}")]
    InvalidTicker(String),
    /// Price was zero, negative, or not a number.
    #[error("price must be positive, got {0}")]
    InvalidPrice(f64),
    /// Buy cost exceeds the available cash balance.
    #[error("insufficient cash: {shortfall} more needed")]
    InsufficientFunds { shortfall: f64 },
    /// Sell quantity exceeds the held quantity.
    #[error("insufficient {ticker}: {shortfall} more needed")]
    InsufficientHoldings { ticker: String, shortfall: f64 },
    /// The store failed; the operation was aborted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful trade: the updated position (`None` when a sell
/// closed it) and the receipt.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub position: Option<Position>,
    pub receipt: TradeReceipt,
}

/// Executes trades against the store. Holds no position state of its own:
/// every call re-reads current truth from the store.
pub struct Ledger {
    store: Arc<dyn PositionStore>,
    // Serializes the read-modify-write cycle so two concurrent trades
    // cannot lose an update between the read and the write.
    write_gate: Mutex<()>,
}

impl Ledger {
    pub fn new(store: Arc<dyn PositionStore>) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    /// Execute one buy or sell of `quantity` units at `price` dollars each.
    ///
    /// Buy deducts cash and recomputes the weighted average cost; sell adds
    /// the proceeds to cash and leaves the average cost untouched, deleting
    /// the row when the position reaches zero. Validation and solvency are
    /// checked before anything is written.
    pub async fn execute(
        &self,
        ticker: &str,
        quantity: f64,
        side: TradeSide,
        price: f64,
    ) -> Result<TradeOutcome, LedgerError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() || ticker == CASH_TICKER {
            return Err(LedgerError::InvalidTicker(ticker));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(LedgerError::InvalidPrice(price));
        }

        let _gate = self.write_gate.lock().await;

        let cash = match self.store.read(CASH_TICKER).await? {
            Some(position) => position.quantity,
            None => 0.0,
        };
        let held = self.store.read(&ticker).await?;
        let held_qty = held.as_ref().map(|p| p.quantity).unwrap_or(0.0);

        match side {
            TradeSide::Buy => {
                let cost = quantity * price;
                if cash < cost {
                    return Err(LedgerError::InsufficientFunds {
                        shortfall: cost - cash,
                    });
                }

                let new_qty = held_qty + quantity;
                // Weighted average when adding to an existing holding; a
                // fresh position starts at the trade price.
                let new_avg = if held_qty > 0.0 {
                    let held_avg = held.as_ref().and_then(|p| p.average_cost).unwrap_or(0.0);
                    (held_qty * held_avg + quantity * price) / new_qty
                } else {
                    price
                };

                self.store.write(CASH_TICKER, cash - cost, None).await?;
                self.store.write(&ticker, new_qty, Some(new_avg)).await?;

                Ok(TradeOutcome {
                    position: Some(Position {
                        ticker: ticker.clone(),
                        quantity: new_qty,
                        average_cost: Some(new_avg),
                    }),
                    receipt: receipt(ticker, side, quantity, price, cost),
                })
            }
            TradeSide::Sell => {
                if held_qty < quantity {
                    return Err(LedgerError::InsufficientHoldings {
                        ticker,
                        shortfall: quantity - held_qty,
                    });
                }

                let proceeds = quantity * price;
                let new_qty = held_qty - quantity;

                self.store.write(CASH_TICKER, cash + proceeds, None).await?;

                if new_qty == 0.0 {
                    self.store.delete(&ticker).await?;
                    Ok(TradeOutcome {
                        position: None,
                        receipt: receipt(ticker, side, quantity, price, proceeds),
                    })
                } else {
                    // Selling never moves the average cost.
                    let held_avg = held.and_then(|p| p.average_cost);
                    self.store.write(&ticker, new_qty, held_avg).await?;
                    Ok(TradeOutcome {
                        position: Some(Position {
                            ticker: ticker.clone(),
                            quantity: new_qty,
                            average_cost: held_avg,
                        }),
                        receipt: receipt(ticker, side, quantity, price, proceeds),
                    })
                }
            }
        }
    }

    /// Current position for a ticker, `None` when nothing is held.
    pub async fn position(&self, ticker: &str) -> Result<Option<Position>, LedgerError> {
        Ok(self.store.read(&ticker.trim().to_uppercase()).await?)
    }

    /// All current positions, cash row included.
    pub async fn positions(&self) -> Result<Vec<Position>, LedgerError> {
        Ok(self.store.list_all().await?)
    }

    /// Current cash balance in dollars (0 when no cash row exists).
    pub async fn cash_balance(&self) -> Result<f64, LedgerError> {
        let cash = self.store.read(CASH_TICKER).await?;
        Ok(cash.map(|p| p.quantity).unwrap_or(0.0))
    }
}

/// Unrealized P&L: (current_price - average_cost) * quantity.
pub fn unrealized_pnl(position: &Position, current_price: f64) -> f64 {
    let average_cost = position.average_cost.unwrap_or(current_price);
    (current_price - average_cost) * position.quantity
}

fn receipt(ticker: String, side: TradeSide, quantity: f64, price: f64, realized: f64) -> TradeReceipt {
    TradeReceipt {
        id: Uuid::new_v4(),
        ticker,
        side,
        quantity,
        price,
        realized,
        timestamp: Utc::now(),
    }
}
