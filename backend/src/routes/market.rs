use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{HistoryParams, HistoryPoint, HomePage, StockSummary};
use crate::services::market_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/price/:symbol", get(get_price))
        .route("/api/top_stocks", get(get_top_stocks))
        .route("/api/stock_history/:symbol", get(get_stock_history))
        .route("/api/home", get(get_home))
}

pub async fn get_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockSummary>, AppError> {
    info!("GET /api/price/{} - Fetching quote", symbol);
    let summary = market_service::price(state.market_data.as_ref(), &symbol)
        .await
        .map_err(|e| {
            error!("Failed to fetch price for {}: {}", symbol, e);
            e
        })?;
    Ok(Json(summary))
}

pub async fn get_top_stocks(State(state): State<AppState>) -> Json<Vec<StockSummary>> {
    info!("GET /api/top_stocks - Fetching top stocks");
    Json(market_service::top_stocks(state.market_data.as_ref()).await)
}

pub async fn get_stock_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryPoint>>, AppError> {
    info!("GET /api/stock_history/{} - Fetching history", symbol);
    let history = market_service::stock_history(state.market_data.as_ref(), &symbol, params.days)
        .await
        .map_err(|e| {
            error!("Failed to fetch history for {}: {}", symbol, e);
            e
        })?;
    Ok(Json(history))
}

pub async fn get_home(State(state): State<AppState>) -> Json<HomePage> {
    info!("GET /api/home - Fetching home page data");
    Json(market_service::home(state.market_data.as_ref()).await)
}
