use crate::external::market_data::{MarketDataCache, MarketDataError, MarketDataProvider};
use crate::models::{CompanyProfile, HistoryPoint, NewsArticle, Quote};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

const BASE_URL: &str = "https://finnhub.io/api/v1";

pub struct FinnhubProvider {
    client: reqwest::Client,
    api_key: String,
    cache: MarketDataCache,
}

impl FinnhubProvider {
    pub fn new(
        api_key: String,
        timeout: std::time::Duration,
        cache: MarketDataCache,
    ) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        Ok(Self { client, api_key, cache })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}/{}", BASE_URL, path);
        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("token", self.api_key.clone()));

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited);
        }
        if !status.is_success() {
            return Err(MarketDataError::BadResponse(format!("{} returned {}", path, status)));
        }

        resp.json::<T>()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FhQuote {
    // current price; 0 when the symbol is unknown
    c: Option<f64>,
    pc: Option<f64>,
    v: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FhProfile {
    name: Option<String>,
    #[serde(rename = "finnhubIndustry")]
    finnhub_industry: Option<String>,
    #[serde(rename = "marketCapitalization")]
    market_capitalization: Option<f64>,
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FhNewsItem {
    headline: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    source: Option<String>,
    datetime: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FhCandles {
    s: String,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    c: Vec<f64>,
}

fn to_article(item: FhNewsItem) -> Option<NewsArticle> {
    let title = item.headline.filter(|h| !h.trim().is_empty())?;
    let published_at = item
        .datetime
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Some(NewsArticle {
        title,
        description: item.summary.unwrap_or_default(),
        url: item.url.unwrap_or_else(|| "#".to_string()),
        source: item.source.unwrap_or_default(),
        published_at,
    })
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let cache_key = format!("quote_{}", symbol);
        if let Some(quote) = self.cache.quotes.get(&cache_key) {
            return Ok(quote);
        }

        let body: FhQuote = self
            .get_json("quote", &[("symbol", symbol.to_string())])
            .await?;

        let current = body
            .c
            .filter(|c| *c > 0.0)
            .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))?;

        let quote = Quote {
            symbol: symbol.to_string(),
            current: (current * 100.0).round() / 100.0,
            previous_close: body.pc.filter(|pc| *pc > 0.0),
            volume: body.v,
        };

        self.cache.quotes.insert(&cache_key, quote.clone());
        Ok(quote)
    }

    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        let cache_key = format!("profile_{}", symbol);
        if let Some(profile) = self.cache.profiles.get(&cache_key) {
            return Ok(profile);
        }

        let body: FhProfile = self
            .get_json("stock/profile2", &[("symbol", symbol.to_string())])
            .await?;

        let profile = CompanyProfile {
            symbol: symbol.to_string(),
            name: body.name.filter(|n| !n.is_empty()),
            industry: body.finnhub_industry.filter(|i| !i.is_empty()),
            market_cap: body.market_capitalization,
            logo: body.logo.filter(|l| !l.is_empty()),
        };

        self.cache.profiles.insert(&cache_key, profile.clone());
        Ok(profile)
    }

    async fn fetch_company_news(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, MarketDataError> {
        let cache_key = format!("news_{}_{}", symbol, limit);
        if let Some(news) = self.cache.news.get(&cache_key) {
            return Ok(news);
        }

        let to = Utc::now().date_naive();
        let from = to - Duration::days(7);

        let items: Vec<FhNewsItem> = self
            .get_json(
                "company-news",
                &[
                    ("symbol", symbol.to_string()),
                    ("from", from.format("%Y-%m-%d").to_string()),
                    ("to", to.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        let news: Vec<NewsArticle> = items.into_iter().filter_map(to_article).take(limit).collect();
        debug!("Fetched {} news articles for {}", news.len(), symbol);

        self.cache.news.insert(&cache_key, news.clone());
        Ok(news)
    }

    async fn fetch_general_news(&self, limit: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
        let cache_key = format!("general_news_{}", limit);
        if let Some(news) = self.cache.news.get(&cache_key) {
            return Ok(news);
        }

        let items: Vec<FhNewsItem> = self
            .get_json("news", &[("category", "general".to_string())])
            .await?;

        let news: Vec<NewsArticle> = items.into_iter().filter_map(to_article).take(limit).collect();
        self.cache.news.insert(&cache_key, news.clone());
        Ok(news)
    }

    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, MarketDataError> {
        let cache_key = format!("history_{}_{}", symbol, days);
        if let Some(history) = self.cache.history.get(&cache_key) {
            return Ok(history);
        }

        let end = Utc::now();
        let start = end - Duration::days(days as i64);

        let body: FhCandles = self
            .get_json(
                "stock/candle",
                &[
                    ("symbol", symbol.to_string()),
                    ("resolution", "D".to_string()),
                    ("from", start.timestamp().to_string()),
                    ("to", end.timestamp().to_string()),
                ],
            )
            .await?;

        if body.s != "ok" || body.t.is_empty() {
            warn!("No candle data for {} (status: {})", symbol, body.s);
            return Err(MarketDataError::NoData(symbol.to_string()));
        }

        // t and c are parallel arrays; zip stops at the shorter one
        let history: Vec<HistoryPoint> = body
            .t
            .iter()
            .zip(body.c.iter())
            .filter_map(|(ts, close)| {
                DateTime::from_timestamp(*ts, 0).map(|dt| HistoryPoint {
                    date: dt.date_naive(),
                    price: *close,
                })
            })
            .collect();

        self.cache.history.insert(&cache_key, history.clone());
        Ok(history)
    }
}
