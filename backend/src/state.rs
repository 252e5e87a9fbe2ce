use std::sync::Arc;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::external::market_data::{MarketDataCache, MarketDataProvider};
use crate::services::dashboard_service::SentimentEngine;
use crate::services::notification_service::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub market_data: Arc<dyn MarketDataProvider>,
    pub engine: SentimentEngine,
    pub notifier: Arc<dyn Notifier>,
    pub cache: MarketDataCache,
}
