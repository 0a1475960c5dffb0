use serde::{Deserialize, Serialize};

/// Reserved ticker for the fiat cash balance, unit-priced at 1 dollar.
pub const CASH_TICKER: &str = "CASH";

/// One portfolio row: a held asset (quantity + average purchase price) or
/// the cash balance. The cash row never carries an average cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub quantity: f64,
    pub average_cost: Option<f64>,
}

impl Position {
    pub fn is_cash(&self) -> bool {
        self.ticker == CASH_TICKER
    }
}
