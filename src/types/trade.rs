use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Receipt for one executed trade. `realized` is the cash spent on a buy or
/// the proceeds of a sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub id: Uuid,
    pub ticker: String,
    pub side: TradeSide,
    pub quantity: f64,
    pub price: f64,
    pub realized: f64,
    pub timestamp: DateTime<Utc>,
}
