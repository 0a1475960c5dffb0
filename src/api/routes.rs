//! HTTP surface: portfolio reads, trade execution, price history, assistant.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::assistant::gemini::GeminiClient;
use crate::ledger::engine::{Ledger, LedgerError};
use crate::ledger::summary::summarize;
use crate::prices::{CoinbaseSource, PriceFeed};
use crate::types::position::Position;
use crate::types::trade::{TradeReceipt, TradeSide};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub prices: Arc<PriceFeed>,
    pub coinbase: Option<Arc<CoinbaseSource>>,
    pub assistant: Option<Arc<GeminiClient>>,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/portfolio", get(get_portfolio))
        .route("/api/portfolio/summary", get(get_summary))
        .route("/api/portfolio/{ticker}", get(get_position))
        .route("/api/cash", get(get_cash))
        .route("/api/transaction", post(post_transaction))
        .route("/api/historical-prices/{ticker}", get(get_historical_prices))
        .route("/api/gemini", post(post_chat))
        .route("/api/gemini-coin-analysis", post(post_coin_analysis))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

fn ledger_error_response(err: LedgerError) -> Response {
    let status = match err {
        LedgerError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    };
    error_body(status, err.to_string())
}

async fn get_portfolio(State(state): State<AppState>) -> Response {
    match state.ledger.positions().await {
        Ok(positions) => Json(positions).into_response(),
        Err(err) => ledger_error_response(err),
    }
}

async fn get_position(State(state): State<AppState>, Path(ticker): Path<String>) -> Response {
    match state.ledger.position(&ticker).await {
        Ok(Some(position)) => Json(position).into_response(),
        Ok(None) => error_body(
            StatusCode::NOT_FOUND,
            format!("no position for {}", ticker.to_uppercase()),
        ),
        Err(err) => ledger_error_response(err),
    }
}

async fn get_cash(State(state): State<AppState>) -> Response {
    match state.ledger.cash_balance().await {
        Ok(cash) => Json(json!({ "cash": cash })).into_response(),
        Err(err) => ledger_error_response(err),
    }
}

async fn get_summary(State(state): State<AppState>) -> Response {
    let positions = match state.ledger.positions().await {
        Ok(positions) => positions,
        Err(err) => return ledger_error_response(err),
    };

    let mut prices: HashMap<String, f64> = HashMap::new();
    for position in &positions {
        if !position.is_cash() {
            let quote = state.prices.quote(&position.ticker).await;
            prices.insert(position.ticker.clone(), quote);
        }
    }

    let summary = summarize(&positions, |ticker| {
        prices.get(ticker).copied().unwrap_or(1.0)
    });
    Json(summary).into_response()
}

#[derive(Debug, Deserialize)]
struct TransactionRequest {
    ticker: String,
    quantity: f64,
    action: TradeSide,
    // Live price supplied by the caller; quoted from the price feed when
    // absent.
    price: Option<f64>,
}

#[derive(Debug, Serialize)]
struct TransactionResponse {
    success: bool,
    position: Option<Position>,
    receipt: TradeReceipt,
}

async fn post_transaction(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> Response {
    let price = match request.price {
        Some(price) => price,
        None => state.prices.quote(&request.ticker).await,
    };

    match state
        .ledger
        .execute(&request.ticker, request.quantity, request.action, price)
        .await
    {
        Ok(outcome) => {
            info!(
                "executed {:?} {} {} at {}",
                request.action, request.quantity, outcome.receipt.ticker, price
            );
            Json(TransactionResponse {
                success: true,
                position: outcome.position,
                receipt: outcome.receipt,
            })
            .into_response()
        }
        Err(err) => ledger_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    granularity: Option<String>,
    days_back: Option<i64>,
}

async fn get_historical_prices(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let Some(coinbase) = &state.coinbase else {
        return error_body(
            StatusCode::SERVICE_UNAVAILABLE,
            "price source not configured".to_string(),
        );
    };

    let product = ticker.to_uppercase();
    let granularity = query.granularity.unwrap_or_else(|| "ONE_DAY".to_string());
    let days_back = query.days_back.unwrap_or(350);

    match coinbase.candles(&product, &granularity, days_back).await {
        Ok(data) => Json(json!({
            "success": true,
            "ticker": product,
            "granularity": granularity,
            "days_back": days_back,
            "data": data,
        }))
        .into_response(),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "success": false, "ticker": product, "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    prompt: String,
}

async fn post_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let Some(assistant) = &state.assistant else {
        return error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Gemini API key not set".to_string(),
        );
    };
    if request.prompt.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Prompt is required".to_string());
    }

    match assistant.chat(&request.prompt).await {
        Ok(text) => Json(json!({ "research": text })).into_response(),
        Err(err) => {
            error!("gemini chat failed: {err}");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch from Gemini API".to_string(),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    crypto: String,
    action: String,
    amount: Option<f64>,
}

async fn post_coin_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Response {
    let Some(assistant) = &state.assistant else {
        return error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Gemini API key not set".to_string(),
        );
    };
    if request.crypto.trim().is_empty() {
        return error_body(
            StatusCode::BAD_REQUEST,
            "Crypto symbol is required".to_string(),
        );
    }

    let amount = request.amount.unwrap_or(0.0);
    match assistant
        .coin_analysis(&request.crypto, &request.action, amount)
        .await
    {
        Ok(analysis) => {
            // Echo the request details alongside the analysis, as the
            // frontend expects.
            let mut value = serde_json::to_value(&analysis).unwrap_or_default();
            value["request"] = json!({
                "crypto": request.crypto,
                "action": request.action,
                "amount": request.amount,
            });
            Json(json!({ "success": true, "analysis": value })).into_response()
        }
        Err(err) => {
            error!("gemini coin analysis failed: {err}");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch coin analysis".to_string(),
            )
        }
    }
}
