//! Portfolio summary tests: valuation, P&L, totals.

use std::sync::Arc;

use crypto_portfolio::ledger::engine::{Ledger, unrealized_pnl};
use crypto_portfolio::ledger::summary::summarize;
use crypto_portfolio::persistence::MemoryStore;
use crypto_portfolio::prices::StaticPrices;
use crypto_portfolio::types::position::Position;
use crypto_portfolio::types::trade::TradeSide;

#[tokio::test]
async fn summary_values_holdings_at_current_price() {
    let ledger = Ledger::new(Arc::new(MemoryStore::with_cash(100_000.0)));
    ledger
        .execute("BTC", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();

    let positions = ledger.positions().await.unwrap();
    let summary = summarize(&positions, StaticPrices::lookup);

    assert_eq!(summary.cash, 40_000.0);
    assert_eq!(summary.holdings.len(), 1);
    let btc = &summary.holdings[0];
    assert_eq!(btc.ticker, "BTC");
    assert_eq!(btc.value, 67_234.0);
    assert_eq!(btc.profit_loss, 67_234.0 - 60_000.0);
    assert_eq!(summary.total_value, 40_000.0 + 67_234.0);
    assert_eq!(summary.total_invested, 60_000.0);
    let expected_pct = (67_234.0 - 60_000.0) / 60_000.0 * 100.0;
    assert_eq!(summary.profit_loss_percentage, expected_pct);
}

#[tokio::test]
async fn empty_portfolio_summary_is_all_zero() {
    let summary = summarize(&[], StaticPrices::lookup);

    assert_eq!(summary.cash, 0.0);
    assert_eq!(summary.total_value, 0.0);
    assert_eq!(summary.total_invested, 0.0);
    assert_eq!(summary.total_profit_loss, 0.0);
    assert_eq!(summary.profit_loss_percentage, 0.0);
    assert!(summary.holdings.is_empty());
}

#[test]
fn unrealized_pnl_gain_and_loss() {
    let position = Position {
        ticker: "BTC".to_string(),
        quantity: 2.0,
        average_cost: Some(60_000.0),
    };

    assert_eq!(unrealized_pnl(&position, 65_000.0), 10_000.0);
    assert_eq!(unrealized_pnl(&position, 55_000.0), -10_000.0);
}

#[test]
fn position_without_average_cost_has_no_pnl() {
    let position = Position {
        ticker: "BTC".to_string(),
        quantity: 2.0,
        average_cost: None,
    };

    assert_eq!(unrealized_pnl(&position, 65_000.0), 0.0);
}
