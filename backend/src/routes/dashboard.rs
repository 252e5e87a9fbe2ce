use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::Dashboard;
use crate::services::auth_service::AuthUser;
use crate::services::dashboard_service::evaluate_for_user;
use crate::services::notification_service::dashboard_summary_email;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Dashboard>, AppError> {
    info!("GET /api/dashboard - Evaluating portfolio for {}", user.username);
    let dashboard = evaluate_for_user(
        &state.pool,
        state.market_data.as_ref(),
        &state.engine,
        &state.config.sentiment,
        user.id,
    )
    .await
    .map_err(|e| {
        error!("Failed to evaluate dashboard for {}: {}", user.username, e);
        e
    })?;

    // summary email is best-effort and must not delay the response
    if let Some(recipient) = &state.config.mail.recipient {
        if !dashboard.rows.is_empty() {
            let email = dashboard_summary_email(recipient, &dashboard);
            let notifier = state.notifier.clone();
            tokio::spawn(async move {
                if let Err(e) = notifier.send(&email).await {
                    warn!("Failed to send dashboard summary: {}", e);
                }
            });
        }
    }

    Ok(Json(dashboard))
}
