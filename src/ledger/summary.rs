//! Portfolio valuation: per-holding value and P&L plus portfolio totals.

use serde::Serialize;

use crate::ledger::engine::unrealized_pnl;
use crate::types::position::Position;

/// One holding valued at the current market price.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingView {
    pub ticker: String,
    pub quantity: f64,
    pub average_cost: f64,
    pub current_price: f64,
    pub value: f64,
    pub profit_loss: f64,
}

/// Snapshot of the whole portfolio. `total_value` includes cash.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub cash: f64,
    pub total_value: f64,
    pub total_invested: f64,
    pub total_profit_loss: f64,
    pub profit_loss_percentage: f64,
    pub holdings: Vec<HoldingView>,
}

/// Build a summary from stored positions and a per-ticker price lookup.
pub fn summarize<F>(positions: &[Position], price_of: F) -> PortfolioSummary
where
    F: Fn(&str) -> f64,
{
    let mut cash = 0.0;
    let mut holdings = Vec::new();
    let mut holdings_value = 0.0;
    let mut total_invested = 0.0;
    let mut total_profit_loss = 0.0;

    for position in positions {
        if position.is_cash() {
            cash = position.quantity;
            continue;
        }
        let current_price = price_of(&position.ticker);
        let average_cost = position.average_cost.unwrap_or(current_price);
        let value = position.quantity * current_price;
        let profit_loss = unrealized_pnl(position, current_price);

        holdings_value += value;
        total_invested += position.quantity * average_cost;
        total_profit_loss += profit_loss;
        holdings.push(HoldingView {
            ticker: position.ticker.clone(),
            quantity: position.quantity,
            average_cost,
            current_price,
            value,
            profit_loss,
        });
    }

    let profit_loss_percentage = if total_invested > 0.0 {
        total_profit_loss / total_invested * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        cash,
        total_value: cash + holdings_value,
        total_invested,
        total_profit_loss,
        profit_loss_percentage,
        holdings,
    }
}
