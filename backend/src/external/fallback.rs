use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{CompanyProfile, HistoryPoint, NewsArticle, Quote};
use async_trait::async_trait;
use tracing::warn;

/// FallbackProvider asks the primary provider first and answers from the
/// fallback (normally [`crate::external::mock::MockMarketData`]) when it fails.
///
/// Company news is the exception: a failed news lookup yields no articles
/// rather than invented ones, so sentiment falls back to the price change.
pub struct FallbackProvider {
    primary: Box<dyn MarketDataProvider>,
    fallback: Box<dyn MarketDataProvider>,
}

impl FallbackProvider {
    pub fn new(primary: Box<dyn MarketDataProvider>, fallback: Box<dyn MarketDataProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl MarketDataProvider for FallbackProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        match self.primary.fetch_quote(symbol).await {
            Ok(quote) => Ok(quote),
            Err(e) => {
                warn!("Quote lookup failed for {}: {}. Using fallback data.", symbol, e);
                self.fallback.fetch_quote(symbol).await
            }
        }
    }

    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        match self.primary.fetch_company_profile(symbol).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                warn!("Profile lookup failed for {}: {}", symbol, e);
                self.fallback.fetch_company_profile(symbol).await
            }
        }
    }

    async fn fetch_company_news(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, MarketDataError> {
        match self.primary.fetch_company_news(symbol, limit).await {
            Ok(news) => Ok(news),
            Err(e) => {
                warn!("News lookup failed for {}: {}", symbol, e);
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_general_news(&self, limit: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
        match self.primary.fetch_general_news(limit).await {
            Ok(news) => Ok(news),
            Err(e) => {
                warn!("General news lookup failed: {}. Using fallback headlines.", e);
                self.fallback.fetch_general_news(limit).await
            }
        }
    }

    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, MarketDataError> {
        match self.primary.fetch_daily_history(symbol, days).await {
            Ok(history) => Ok(history),
            Err(e) => {
                warn!("History lookup failed for {}: {}. Using fallback history.", symbol, e);
                self.fallback.fetch_daily_history(symbol, days).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mock::MockMarketData;

    struct FailingProvider;

    #[async_trait]
    impl MarketDataProvider for FailingProvider {
        async fn fetch_quote(&self, _symbol: &str) -> Result<Quote, MarketDataError> {
            Err(MarketDataError::Network("connection refused".into()))
        }

        async fn fetch_company_profile(&self, _symbol: &str) -> Result<CompanyProfile, MarketDataError> {
            Err(MarketDataError::RateLimited)
        }

        async fn fetch_company_news(&self, _symbol: &str, _limit: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
            Err(MarketDataError::RateLimited)
        }

        async fn fetch_general_news(&self, _limit: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
            Err(MarketDataError::BadResponse("500".into()))
        }

        async fn fetch_daily_history(&self, _symbol: &str, _days: u32) -> Result<Vec<HistoryPoint>, MarketDataError> {
            Err(MarketDataError::NoData("AAPL".into()))
        }
    }

    fn provider() -> FallbackProvider {
        FallbackProvider::new(Box::new(FailingProvider), Box::new(MockMarketData))
    }

    #[tokio::test]
    async fn test_quote_falls_back() {
        let quote = provider().fetch_quote("AAPL").await.unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert!(quote.previous_close.is_none());
    }

    #[tokio::test]
    async fn test_company_news_failure_yields_no_articles() {
        let news = provider().fetch_company_news("AAPL", 2).await.unwrap();
        assert!(news.is_empty());
    }

    #[tokio::test]
    async fn test_history_falls_back_to_random_walk() {
        let history = provider().fetch_daily_history("AAPL", 10).await.unwrap();
        assert_eq!(history.len(), 10);
    }
}
