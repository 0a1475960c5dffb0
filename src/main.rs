use std::env;
use std::sync::Arc;

use crypto_portfolio::api::routes::{AppState, app_router};
use crypto_portfolio::assistant::gemini::GeminiClient;
use crypto_portfolio::ledger::engine::Ledger;
use crypto_portfolio::persistence::{
    MemoryStore, PgPositionStore, PositionStore, connect_and_migrate,
};
use crypto_portfolio::prices::{CoinbaseSource, PriceFeed, PriceSource};
use dotenvy::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let store: Arc<dyn PositionStore> = match env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = connect_and_migrate(&url).await.unwrap();
            Arc::new(PgPositionStore::new(pool))
        }
        Err(_) => {
            warn!("DATABASE_URL not set, portfolio will not persist across restarts");
            let starting_cash = env::var("STARTING_CASH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000.0);
            Arc::new(MemoryStore::with_cash(starting_cash))
        }
    };

    let coinbase = match (
        env::var("COINBASE_API_KEY_NAME"),
        env::var("COINBASE_API_KEY_SECRET"),
    ) {
        (Ok(name), Ok(secret)) => Some(Arc::new(CoinbaseSource::new(name, secret))),
        _ => {
            warn!("Coinbase API keys not set, live prices disabled");
            None
        }
    };
    let live = coinbase
        .as_ref()
        .map(|source| Box::new(source.as_ref().clone()) as Box<dyn PriceSource>);

    let assistant = env::var("GEMINI_API_KEY")
        .ok()
        .map(|key| Arc::new(GeminiClient::new(key)));
    if assistant.is_none() {
        warn!("GEMINI_API_KEY not set, assistant endpoints disabled");
    }

    let state = AppState {
        ledger: Arc::new(Ledger::new(store)),
        prices: Arc::new(PriceFeed::new(live)),
        coinbase,
        assistant,
    };

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4000);
    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();
    info!("backend running on port {port}");
    axum::serve(listener, app).await.unwrap();
}
