use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use sentifolio_backend::app;
use sentifolio_backend::config::AppConfig;
use sentifolio_backend::external::fallback::FallbackProvider;
use sentifolio_backend::external::finnhub::FinnhubProvider;
use sentifolio_backend::external::market_data::{MarketDataCache, MarketDataProvider};
use sentifolio_backend::external::mock::MockMarketData;
use sentifolio_backend::logging::{init_logging, LoggingConfig};
use sentifolio_backend::services::auth_service;
use sentifolio_backend::services::dashboard_service::SentimentEngine;
use sentifolio_backend::services::job_scheduler_service::{JobContext, JobSchedulerService};
use sentifolio_backend::services::notification_service::build_notifier;
use sentifolio_backend::services::sentiment_classifier::build_classifier;
use sentifolio_backend::services::sentiment_history::PgSentimentHistoryStore;
use sentifolio_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = Arc::new(AppConfig::from_env().context("invalid configuration")?);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    auth_service::seed_admin(&pool, &config.auth).await?;

    let timeout = Duration::from_secs(config.market_data.request_timeout_seconds);
    let cache = MarketDataCache::new(
        Duration::from_secs(config.market_data.cache_ttl_seconds),
        config.market_data.cache_enabled,
    );

    let market_data: Arc<dyn MarketDataProvider> = match &config.market_data.finnhub_api_key {
        Some(api_key) => {
            info!("📊 Using market data provider: Finnhub (mock fallback)");
            let primary = Box::new(FinnhubProvider::new(api_key.clone(), timeout, cache.clone())?);
            Arc::new(FallbackProvider::new(primary, Box::new(MockMarketData)))
        }
        None => {
            warn!("📊 FINNHUB_API_KEY not set, using mock market data");
            Arc::new(MockMarketData)
        }
    };

    let classifier = build_classifier(&config.sentiment, timeout)?;
    let history = Arc::new(PgSentimentHistoryStore::new(pool.clone()));
    let engine = SentimentEngine::new(
        classifier,
        history,
        config.sentiment.lookback_window(),
    );
    let notifier = build_notifier(&config.mail)?;

    let state = AppState {
        pool,
        config: config.clone(),
        market_data,
        engine,
        notifier,
        cache,
    };

    let mut scheduler = if config.scheduler.enabled {
        let mut scheduler = JobSchedulerService::new(JobContext::from_state(&state)).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        info!("Background monitor disabled");
        None
    };

    let app = app::create_app(state);

    let addr = SocketAddr::from((config.server.host, config.server.port));
    let listener = TcpListener::bind(&addr).await?;
    info!("🚀 Sentifolio backend running at http://{}/", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.stop().await {
            error!("Failed to stop scheduler: {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
