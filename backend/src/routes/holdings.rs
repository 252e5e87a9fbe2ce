use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use http::StatusCode;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, UpdateHolding};
use crate::services;
use crate::services::auth_service::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_holdings).post(create_holding))
        .route("/:id", put(update_holding).delete(delete_holding))
}

pub async fn fetch_holdings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Holding>>, AppError> {
    info!("GET /api/holdings - Fetching holdings for {}", user.username);
    let holdings = services::holding_service::fetch_all(&state.pool, user.id)
        .await
        .map_err(|e| {
            error!("Failed to fetch holdings: {}", e);
            e
        })?;
    Ok(Json(holdings))
}

pub async fn create_holding(
    State(state): State<AppState>,
    user: AuthUser,
    Json(data): Json<CreateHolding>,
) -> Result<(StatusCode, Json<Holding>), AppError> {
    info!("POST /api/holdings - Adding {} for {}", data.symbol, user.username);
    let holding = services::holding_service::create(&state.pool, user.id, data)
        .await
        .map_err(|e| {
            error!("Failed to create holding: {}", e);
            e
        })?;
    Ok((StatusCode::CREATED, Json(holding)))
}

pub async fn update_holding(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateHolding>,
) -> Result<Json<Holding>, AppError> {
    info!("PUT /api/holdings/{} - Updating holding", id);
    let holding = services::holding_service::update(&state.pool, user.id, id, data)
        .await
        .map_err(|e| {
            error!("Failed to update holding {}: {}", id, e);
            e
        })?;
    Ok(Json(holding))
}

pub async fn delete_holding(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /api/holdings/{} - Deleting holding", id);
    services::holding_service::delete(&state.pool, user.id, id)
        .await
        .map_err(|e| {
            error!("Failed to delete holding {}: {}", id, e);
            e
        })?;
    Ok(StatusCode::NO_CONTENT)
}
