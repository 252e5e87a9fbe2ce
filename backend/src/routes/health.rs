use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, warn};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/ready", get(ready))
}

async fn health() -> &'static str {
    info!("GET /health - Health check");
    "OK"
}

/// Readiness also requires the database to answer.
async fn ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, "READY"),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "DATABASE UNAVAILABLE")
        }
    }
}
