//! Price lookup: source contract, placeholder table, Coinbase candles.

mod coinbase;
mod source;

pub use coinbase::{Candle, CandleResponse, CoinbaseSource};
pub use source::{PriceError, PriceFeed, PriceSource, StaticPrices};
