use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{CompanyProfile, HistoryPoint, NewsArticle, Quote};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;

/// Stand-in data used when the real provider is unavailable.
///
/// Quotes are random but carry no previous close, so they never move a
/// holding's sentiment. Company news is empty; general news is a fixed set of
/// headlines.
pub struct MockMarketData;

const MOCK_HEADLINES: &[(&str, &str, &str)] = &[
    ("Market Update: Stocks Show Mixed Performance", "Major indices show mixed performance as investors weigh economic data.", "Financial Times"),
    ("Tech Sector Leads Market Gains", "Technology stocks continue to outperform other sectors.", "Reuters"),
    ("Federal Reserve Policy Update", "Federal Reserve maintains current interest rate policy.", "Bloomberg"),
    ("Earnings Season Kicks Off", "Major companies begin reporting quarterly earnings.", "CNBC"),
    ("Global Markets React to Economic Data", "International markets respond to latest economic indicators.", "MarketWatch"),
];

impl MockMarketData {
    pub fn random_walk(days: u32) -> Vec<HistoryPoint> {
        let mut rng = rand::rng();
        let today = Utc::now().date_naive();
        let mut price: f64 = 100.0 + rng.random_range(-20.0..20.0);

        (1..=days)
            .rev()
            .map(|offset| {
                price = (price + rng.random_range(-3.0..3.0)).max(1.0);
                HistoryPoint {
                    date: today - Duration::days(offset as i64),
                    price: (price * 100.0).round() / 100.0,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let price: f64 = rand::rng().random_range(10.0..500.0);
        Ok(Quote {
            symbol: symbol.to_string(),
            current: (price * 100.0).round() / 100.0,
            previous_close: None,
            volume: None,
        })
    }

    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        Ok(CompanyProfile {
            symbol: symbol.to_string(),
            ..Default::default()
        })
    }

    async fn fetch_company_news(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<NewsArticle>, MarketDataError> {
        Ok(Vec::new())
    }

    async fn fetch_general_news(&self, limit: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
        let now = Utc::now();
        Ok(MOCK_HEADLINES
            .iter()
            .take(limit)
            .map(|(title, description, source)| NewsArticle {
                title: title.to_string(),
                description: description.to_string(),
                url: "#".to_string(),
                source: source.to_string(),
                published_at: now,
            })
            .collect())
    }

    async fn fetch_daily_history(
        &self,
        _symbol: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, MarketDataError> {
        Ok(Self::random_walk(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_shape() {
        let history = MockMarketData::random_walk(30);
        assert_eq!(history.len(), 30);
        assert!(history.iter().all(|p| p.price >= 1.0));
        assert!(history.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(history.last().unwrap().date, Utc::now().date_naive() - Duration::days(1));
    }

    #[tokio::test]
    async fn test_mock_quote_has_no_previous_close() {
        let quote = MockMarketData.fetch_quote("AAPL").await.unwrap();
        assert!(quote.current >= 10.0 && quote.current <= 500.0);
        assert_eq!(quote.change(), 0.0);
        assert_eq!(quote.change_percent(), None);
    }

    #[tokio::test]
    async fn test_mock_general_news_respects_limit() {
        let news = MockMarketData.fetch_general_news(3).await.unwrap();
        assert_eq!(news.len(), 3);
        assert_eq!(news[0].source, "Financial Times");
    }
}
