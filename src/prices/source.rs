use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("price request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("price upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("no usable price for {0}")]
    Missing(String),
    #[error("api key error: {0}")]
    Credentials(#[from] jsonwebtoken::errors::Error),
}

/// Supplies the current market price for a ticker. The ledger only needs a
/// positive number; where it comes from is decided here.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price(&self, ticker: &str) -> Result<f64, PriceError>;
}

/// Placeholder per-ticker prices, used when no live source is configured or
/// the live source fails. Unknown tickers quote at 1 dollar.
pub struct StaticPrices;

static PLACEHOLDER_PRICES: &[(&str, f64)] = &[
    ("BTC", 67_234.0),
    ("ETH", 3_456.0),
    ("SOL", 142.0),
    ("ADA", 0.62),
    ("DOT", 7.89),
    ("MATIC", 0.89),
    ("AVAX", 38.5),
    ("LINK", 14.2),
    ("UNI", 6.5),
    ("ATOM", 9.8),
    ("CASH", 1.0),
];

impl StaticPrices {
    pub fn lookup(ticker: &str) -> f64 {
        let upper = ticker.to_uppercase();
        PLACEHOLDER_PRICES
            .iter()
            .find(|(t, _)| *t == upper)
            .map(|(_, price)| *price)
            .unwrap_or(1.0)
    }
}

#[async_trait]
impl PriceSource for StaticPrices {
    async fn price(&self, ticker: &str) -> Result<f64, PriceError> {
        Ok(Self::lookup(ticker))
    }
}

/// Live source first, placeholder table when the live lookup fails.
pub struct PriceFeed {
    live: Option<Box<dyn PriceSource>>,
}

impl PriceFeed {
    pub fn new(live: Option<Box<dyn PriceSource>>) -> Self {
        Self { live }
    }

    /// Always returns a positive price: live quote when available, else the
    /// placeholder table.
    pub async fn quote(&self, ticker: &str) -> f64 {
        if let Some(live) = &self.live {
            match live.price(ticker).await {
                Ok(price) => return price,
                Err(err) => {
                    warn!("live price lookup for {ticker} failed, using placeholder: {err}");
                }
            }
        }
        StaticPrices::lookup(ticker)
    }
}
