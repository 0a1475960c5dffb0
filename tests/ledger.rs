//! Ledger engine integration tests: execute, conservation, average cost,
//! failure semantics, summary reads.

use std::sync::Arc;

use crypto_portfolio::ledger::engine::{Ledger, LedgerError};
use crypto_portfolio::persistence::MemoryStore;
use crypto_portfolio::types::trade::TradeSide;

fn funded_ledger(cash: f64) -> Ledger {
    Ledger::new(Arc::new(MemoryStore::with_cash(cash)))
}

#[tokio::test]
async fn buy_deducts_cash_and_creates_position() {
    let ledger = funded_ledger(100_000.0);

    let outcome = ledger
        .execute("BTC", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();

    let position = outcome.position.unwrap();
    assert_eq!(position.ticker, "BTC");
    assert_eq!(position.quantity, 1.0);
    assert_eq!(position.average_cost, Some(60_000.0));
    assert_eq!(outcome.receipt.realized, 60_000.0);
    assert_eq!(outcome.receipt.side, TradeSide::Buy);

    assert_eq!(ledger.cash_balance().await.unwrap(), 40_000.0);
}

#[tokio::test]
async fn buy_recomputes_weighted_average() {
    let ledger = funded_ledger(200_000.0);

    ledger
        .execute("BTC", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();
    let outcome = ledger
        .execute("BTC", 1.0, TradeSide::Buy, 70_000.0)
        .await
        .unwrap();

    let position = outcome.position.unwrap();
    assert_eq!(position.quantity, 2.0);
    let expected_avg = (1.0 * 60_000.0 + 1.0 * 70_000.0) / 2.0;
    assert_eq!(position.average_cost, Some(expected_avg));
    assert_eq!(ledger.cash_balance().await.unwrap(), 70_000.0);
}

#[tokio::test]
async fn sell_adds_proceeds_and_keeps_average() {
    let ledger = funded_ledger(200_000.0);

    ledger
        .execute("BTC", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();
    ledger
        .execute("BTC", 1.0, TradeSide::Buy, 70_000.0)
        .await
        .unwrap();
    let outcome = ledger
        .execute("BTC", 1.0, TradeSide::Sell, 80_000.0)
        .await
        .unwrap();

    let position = outcome.position.unwrap();
    assert_eq!(position.quantity, 1.0);
    assert_eq!(position.average_cost, Some(65_000.0));
    assert_eq!(outcome.receipt.realized, 80_000.0);
    assert_eq!(ledger.cash_balance().await.unwrap(), 150_000.0);
}

#[tokio::test]
async fn sell_to_zero_deletes_position() {
    let ledger = funded_ledger(100_000.0);

    ledger
        .execute("BTC", 2.0, TradeSide::Buy, 30_000.0)
        .await
        .unwrap();
    let outcome = ledger
        .execute("BTC", 2.0, TradeSide::Sell, 35_000.0)
        .await
        .unwrap();

    assert!(outcome.position.is_none());
    assert!(ledger.position("BTC").await.unwrap().is_none());
    assert_eq!(ledger.cash_balance().await.unwrap(), 110_000.0);
}

#[tokio::test]
async fn rebuy_after_liquidation_starts_average_fresh() {
    let ledger = funded_ledger(200_000.0);

    ledger
        .execute("BTC", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();
    ledger
        .execute("BTC", 1.0, TradeSide::Sell, 65_000.0)
        .await
        .unwrap();
    let outcome = ledger
        .execute("BTC", 1.0, TradeSide::Buy, 70_000.0)
        .await
        .unwrap();

    assert_eq!(outcome.position.unwrap().average_cost, Some(70_000.0));
}

#[tokio::test]
async fn insufficient_funds_leaves_state_untouched() {
    let ledger = funded_ledger(100.0);

    let err = ledger
        .execute("BTC", 1.0, TradeSide::Buy, 67_234.0)
        .await
        .unwrap_err();

    match err {
        LedgerError::InsufficientFunds { shortfall } => {
            assert_eq!(shortfall, 67_234.0 - 100.0);
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }
    assert_eq!(ledger.cash_balance().await.unwrap(), 100.0);
    assert!(ledger.position("BTC").await.unwrap().is_none());
}

#[tokio::test]
async fn oversell_leaves_state_untouched() {
    let ledger = funded_ledger(100_000.0);

    ledger
        .execute("BTC", 0.5, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();
    let err = ledger
        .execute("BTC", 1.0, TradeSide::Sell, 60_000.0)
        .await
        .unwrap_err();

    match err {
        LedgerError::InsufficientHoldings { ticker, shortfall } => {
            assert_eq!(ticker, "BTC");
            assert_eq!(shortfall, 0.5);
        }
        other => panic!("expected InsufficientHoldings, got {other:?}"),
    }
    let position = ledger.position("BTC").await.unwrap().unwrap();
    assert_eq!(position.quantity, 0.5);
    assert_eq!(ledger.cash_balance().await.unwrap(), 70_000.0);
}

#[tokio::test]
async fn invalid_inputs_rejected_before_any_write() {
    let ledger = funded_ledger(100_000.0);

    let err = ledger
        .execute("BTC", 0.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidQuantity(_)));

    let err = ledger
        .execute("BTC", -1.0, TradeSide::Sell, 60_000.0)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidQuantity(_)));

    let err = ledger
        .execute("", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTicker(_)));

    // The cash row is not tradable.
    let err = ledger
        .execute("cash", 1.0, TradeSide::Buy, 1.0)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTicker(_)));

    let err = ledger
        .execute("BTC", 1.0, TradeSide::Buy, 0.0)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrice(_)));

    let err = ledger
        .execute("BTC", 1.0, TradeSide::Buy, -5.0)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrice(_)));

    assert_eq!(ledger.cash_balance().await.unwrap(), 100_000.0);
    assert_eq!(ledger.positions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn ticker_is_normalized_uppercase() {
    let ledger = funded_ledger(100_000.0);

    ledger
        .execute(" btc ", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();

    let position = ledger.position("btc").await.unwrap().unwrap();
    assert_eq!(position.ticker, "BTC");
}

#[tokio::test]
async fn fractional_quantities_conserve_cash() {
    let ledger = funded_ledger(100_000.0);

    ledger
        .execute("BTC", 0.5, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();

    assert_eq!(ledger.cash_balance().await.unwrap(), 70_000.0);
    let position = ledger.position("BTC").await.unwrap().unwrap();
    assert_eq!(position.quantity, 0.5);
    assert_eq!(position.average_cost, Some(60_000.0));
}

#[tokio::test]
async fn summary_reads_are_idempotent() {
    let ledger = funded_ledger(100_000.0);
    ledger
        .execute("BTC", 1.0, TradeSide::Buy, 60_000.0)
        .await
        .unwrap();
    ledger
        .execute("ETH", 2.0, TradeSide::Buy, 3_000.0)
        .await
        .unwrap();

    let first = ledger.positions().await.unwrap();
    let second = ledger.positions().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        ledger.cash_balance().await.unwrap(),
        ledger.cash_balance().await.unwrap()
    );
}
