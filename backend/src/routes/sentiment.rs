use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{SentimentHistoryParams, SentimentSnapshot};
use crate::services::auth_service::AuthUser;
use crate::services::holding_service::normalize_symbol;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

pub fn router() -> Router<AppState> {
    Router::new().route("/:symbol/history", get(sentiment_history))
}

pub async fn sentiment_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(symbol): Path<String>,
    Query(params): Query<SentimentHistoryParams>,
) -> Result<Json<Vec<SentimentSnapshot>>, AppError> {
    info!("GET /api/sentiment/{}/history - Fetching sentiment history", symbol);
    let symbol = normalize_symbol(&symbol)?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!("limit must be between 1 and {}", MAX_HISTORY_LIMIT)));
    }

    let snapshots = state
        .engine
        .history()
        .history(&symbol, user.id, limit)
        .await
        .map_err(|e| {
            error!("Failed to fetch sentiment history for {}: {}", symbol, e);
            e
        })?;
    Ok(Json(snapshots))
}
