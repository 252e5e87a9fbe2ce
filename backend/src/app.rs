use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{auth, dashboard, health, holdings, jobs, market, sentiment, watchlist};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/dashboard", dashboard::router())
        .nest("/api/holdings", holdings::router())
        .nest("/api/watchlist", watchlist::router())
        .nest("/api/sentiment", sentiment::router())
        .nest("/api/jobs", jobs::router())
        .merge(market::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
