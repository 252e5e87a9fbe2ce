use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CompanyProfile, HistoryPoint, NewsArticle, Quote};
use crate::services::ttl_cache::TtlCache;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("no data for {0}")]
    NoData(String),
}

/// Source of quotes, company profiles, news and price history.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError>;

    /// Company news from the last week, newest first, at most `limit` items.
    async fn fetch_company_news(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, MarketDataError>;

    async fn fetch_general_news(&self, limit: usize) -> Result<Vec<NewsArticle>, MarketDataError>;

    /// Daily closes for the last `days` days, oldest first.
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, MarketDataError>;
}

/// Caches shared by the market data fetchers, one per response kind.
#[derive(Clone)]
pub struct MarketDataCache {
    pub quotes: TtlCache<Quote>,
    pub profiles: TtlCache<CompanyProfile>,
    pub news: TtlCache<Vec<NewsArticle>>,
    pub history: TtlCache<Vec<HistoryPoint>>,
}

impl MarketDataCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            quotes: TtlCache::new(ttl, enabled),
            profiles: TtlCache::new(ttl, enabled),
            news: TtlCache::new(ttl, enabled),
            history: TtlCache::new(ttl, enabled),
        }
    }

    /// Evict expired entries from every cache, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        self.quotes.cleanup_expired()
            + self.profiles.cleanup_expired()
            + self.news.cleanup_expired()
            + self.history.cleanup_expired()
    }
}
