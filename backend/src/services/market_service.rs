use tracing::warn;

use crate::errors::AppError;
use crate::external::market_data::MarketDataProvider;
use crate::external::mock::MockMarketData;
use crate::external::sectors::{FEATURED_STOCKS, POPULAR_SYMBOLS};
use crate::models::{HistoryPoint, HomePage, StockSummary};
use crate::services::holding_service::normalize_symbol;

pub const DEFAULT_HISTORY_DAYS: u32 = 30;
const MAX_HISTORY_DAYS: u32 = 365;
const HOME_NEWS_LIMIT: usize = 5;

/// Quote plus profile for one symbol. `name` and `sector` override the
/// profile when the caller already knows them.
pub async fn stock_summary(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    name: Option<&str>,
    sector: Option<&str>,
) -> Result<StockSummary, AppError> {
    let quote = provider.fetch_quote(symbol).await?;
    let profile = provider.fetch_company_profile(symbol).await.unwrap_or_default();

    Ok(StockSummary {
        symbol: symbol.to_string(),
        name: name
            .map(str::to_string)
            .or_else(|| profile.name.clone())
            .unwrap_or_else(|| symbol.to_string()),
        price: quote.current,
        change: (quote.change() * 100.0).round() / 100.0,
        percent: quote
            .change_percent()
            .map(|p| (p * 100.0).round() / 100.0)
            .unwrap_or(0.0),
        volume: quote.volume,
        sector: sector.unwrap_or_else(|| profile.sector()).to_string(),
        market_cap: profile.market_cap,
        logo: profile.logo.clone(),
    })
}

pub async fn price(provider: &dyn MarketDataProvider, symbol: &str) -> Result<StockSummary, AppError> {
    let symbol = normalize_symbol(symbol)?;
    stock_summary(provider, &symbol, None, None).await
}

/// Popular symbols sorted by day change, biggest gainers first.
/// Symbols whose quote cannot be fetched are left out.
pub async fn top_stocks(provider: &dyn MarketDataProvider) -> Vec<StockSummary> {
    let mut stocks = Vec::with_capacity(POPULAR_SYMBOLS.len());
    for symbol in POPULAR_SYMBOLS {
        match stock_summary(provider, symbol, None, None).await {
            Ok(summary) => stocks.push(summary),
            Err(e) => warn!("Skipping {} in top stocks: {}", symbol, e),
        }
    }

    stocks.sort_by(|a, b| b.change.total_cmp(&a.change));
    stocks
}

pub async fn home(provider: &dyn MarketDataProvider) -> HomePage {
    let mut featured = Vec::with_capacity(FEATURED_STOCKS.len());
    for (symbol, name, sector) in FEATURED_STOCKS {
        match stock_summary(provider, symbol, Some(*name), Some(*sector)).await {
            Ok(summary) => featured.push(summary),
            Err(e) => warn!("Skipping featured {}: {}", symbol, e),
        }
    }

    let news = provider
        .fetch_general_news(HOME_NEWS_LIMIT)
        .await
        .unwrap_or_else(|e| {
            warn!("General news unavailable: {}", e);
            Vec::new()
        });

    HomePage { featured, news }
}

/// Daily closes for a symbol; a random walk stands in when no history is
/// available.
pub async fn stock_history(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    days: Option<u32>,
) -> Result<Vec<HistoryPoint>, AppError> {
    let symbol = normalize_symbol(symbol)?;
    let days = days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if days == 0 || days > MAX_HISTORY_DAYS {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {}",
            MAX_HISTORY_DAYS
        )));
    }

    match provider.fetch_daily_history(&symbol, days).await {
        Ok(history) if !history.is_empty() => Ok(history),
        Ok(_) => Ok(MockMarketData::random_walk(days)),
        Err(e) => {
            warn!("History for {} unavailable: {}. Using generated history.", symbol, e);
            Ok(MockMarketData::random_walk(days))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::market_data::MarketDataError;
    use crate::models::{CompanyProfile, NewsArticle, Quote};
    use async_trait::async_trait;

    // Quote previous close is fixed at 100, current price depends on the symbol.
    struct StubProvider;

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            let current = match symbol {
                "NVDA" => 110.0,
                "TSLA" => 90.0,
                "JNJ" => return Err(MarketDataError::NoData(symbol.to_string())),
                _ => 100.0,
            };
            Ok(Quote {
                symbol: symbol.to_string(),
                current,
                previous_close: Some(100.0),
                volume: Some(1000.0),
            })
        }

        async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
            Ok(CompanyProfile {
                symbol: symbol.to_string(),
                name: Some(format!("{} Corp", symbol)),
                industry: Some("Technology".to_string()),
                ..Default::default()
            })
        }

        async fn fetch_company_news(&self, _symbol: &str, _limit: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
            Ok(Vec::new())
        }

        async fn fetch_general_news(&self, _limit: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
            Err(MarketDataError::RateLimited)
        }

        async fn fetch_daily_history(&self, _symbol: &str, _days: u32) -> Result<Vec<HistoryPoint>, MarketDataError> {
            Err(MarketDataError::RateLimited)
        }
    }

    #[tokio::test]
    async fn test_top_stocks_sorted_by_change() {
        let stocks = top_stocks(&StubProvider).await;
        assert_eq!(stocks.len(), POPULAR_SYMBOLS.len() - 1);
        assert_eq!(stocks.first().unwrap().symbol, "NVDA");
        assert_eq!(stocks.last().unwrap().symbol, "TSLA");
        assert_eq!(stocks[0].percent, 10.0);
    }

    #[tokio::test]
    async fn test_home_uses_featured_names() {
        let page = home(&StubProvider).await;
        assert_eq!(page.featured.len(), FEATURED_STOCKS.len());
        assert_eq!(page.featured[0].name, "Apple Inc.");
        assert_eq!(page.featured[2].sector, "Consumer Discretionary");
        assert!(page.news.is_empty());
    }

    #[tokio::test]
    async fn test_history_falls_back_and_validates() {
        let history = stock_history(&StubProvider, "aapl", Some(7)).await.unwrap();
        assert_eq!(history.len(), 7);

        assert!(matches!(
            stock_history(&StubProvider, "AAPL", Some(0)).await,
            Err(AppError::Validation(_))
        ));
    }
}
