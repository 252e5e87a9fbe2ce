use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

pub async fn login(
    State(state): State<AppState>,
    Json(data): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    info!("POST /api/auth/login - Login attempt for {}", data.username);
    let response = services::auth_service::login(&state.pool, &state.config.auth, data)
        .await
        .map_err(|e| {
            error!("Login failed: {}", e);
            e
        })?;
    Ok(Json(response))
}
