//! Coinbase brokerage candles, authenticated with a short-lived ES256 JWT
//! per request (the CDP key scheme).

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::prices::source::{PriceError, PriceSource};

const COINBASE_HOST: &str = "api.coinbase.com";
const TOKEN_TTL_SECS: i64 = 120;

/// JWT claims for a CDP API key: `uri` is "METHOD host/path".
#[derive(Serialize)]
struct CdpClaims<'a> {
    sub: &'a str,
    iss: &'static str,
    nbf: i64,
    exp: i64,
    uri: String,
}

#[derive(Clone)]
pub struct CoinbaseSource {
    key_name: String,
    key_secret: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub start: String,
    pub low: String,
    pub high: String,
    pub open: String,
    pub close: String,
    pub volume: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleResponse {
    pub candles: Vec<Candle>,
}

impl CoinbaseSource {
    /// `key_secret` is the PEM-encoded EC private key of the CDP API key.
    pub fn new(key_name: String, key_secret: String) -> Self {
        Self {
            key_name,
            key_secret,
            client: reqwest::Client::new(),
        }
    }

    fn bearer_token(&self, method: &str, path: &str) -> Result<String, PriceError> {
        let now = Utc::now().timestamp();
        let claims = CdpClaims {
            sub: &self.key_name,
            iss: "cdp",
            nbf: now,
            exp: now + TOKEN_TTL_SECS,
            uri: format!("{method} {COINBASE_HOST}{path}"),
        };
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_name.clone());
        let key = EncodingKey::from_ec_pem(self.key_secret.as_bytes())?;
        Ok(encode(&header, &claims, &key)?)
    }

    /// Historical candles for a product id such as "BTC-USD", newest first.
    pub async fn candles(
        &self,
        product: &str,
        granularity: &str,
        days_back: i64,
    ) -> Result<CandleResponse, PriceError> {
        let path = format!("/api/v3/brokerage/products/{product}/candles");
        let token = self.bearer_token("GET", &path)?;
        let end = Utc::now().timestamp();
        let start = end - days_back * 86_400;

        let response = self
            .client
            .get(format!("https://{COINBASE_HOST}{path}"))
            .bearer_auth(token)
            .query(&[
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("granularity", granularity.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PriceSource for CoinbaseSource {
    async fn price(&self, ticker: &str) -> Result<f64, PriceError> {
        let product = format!("{}-USD", ticker.to_uppercase());
        let response = self.candles(&product, "ONE_DAY", 1).await?;
        let latest = response
            .candles
            .first()
            .ok_or_else(|| PriceError::Missing(ticker.to_string()))?;
        latest
            .close
            .parse()
            .map_err(|_| PriceError::Missing(ticker.to_string()))
    }
}
