use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::db::job_run_queries;
use crate::errors::AppError;
use crate::models::JobRun;
use crate::services::auth_service::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/runs", get(recent_job_runs))
}

#[derive(Debug, Deserialize)]
pub struct JobRunParams {
    pub limit: Option<i64>,
}

/// GET /api/jobs/runs - Get recent job runs
pub async fn recent_job_runs(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<JobRunParams>,
) -> Result<Json<Vec<JobRun>>, AppError> {
    info!("GET /api/jobs/runs - Fetching recent job runs");
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let runs = job_run_queries::fetch_recent(&state.pool, limit)
        .await
        .map_err(|e| {
            error!("Failed to fetch job runs: {}", e);
            AppError::from(e)
        })?;
    Ok(Json(runs))
}
