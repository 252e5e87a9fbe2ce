use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use http::StatusCode;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{AddWatchlistItem, WatchlistItem};
use crate::services;
use crate::services::auth_service::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_watchlist).post(add_to_watchlist))
        .route("/:symbol", delete(remove_from_watchlist))
}

pub async fn fetch_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<WatchlistItem>>, AppError> {
    info!("GET /api/watchlist - Fetching watchlist for {}", user.username);
    let items = services::watchlist_service::fetch_all(&state.pool, user.id)
        .await
        .map_err(|e| {
            error!("Failed to fetch watchlist: {}", e);
            e
        })?;
    Ok(Json(items))
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(data): Json<AddWatchlistItem>,
) -> Result<(StatusCode, Json<WatchlistItem>), AppError> {
    info!("POST /api/watchlist - Adding {}", data.symbol);
    let item = services::watchlist_service::add(&state.pool, user.id, data)
        .await
        .map_err(|e| {
            error!("Failed to add watchlist item: {}", e);
            e
        })?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(symbol): Path<String>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /api/watchlist/{} - Removing from watchlist", symbol);
    services::watchlist_service::remove(&state.pool, user.id, &symbol)
        .await
        .map_err(|e| {
            error!("Failed to remove {} from watchlist: {}", symbol, e);
            e
        })?;
    Ok(StatusCode::NO_CONTENT)
}
