use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SentimentConfig;
use crate::db;
use crate::errors::AppError;
use crate::external::market_data::MarketDataProvider;
use crate::external::sectors::symbols_for_sector;
use crate::models::{
    CompanyProfile, Dashboard, DashboardRow, Holding, NewSentimentSnapshot, NewsArticle, PortfolioSummary,
    Quote, SectorArticle, SentimentAlert, SentimentClass, SentimentCounts,
};
use crate::services::alert_service::{
    decide, lookback_cutoff, negative_headline_alerts, price_target_alerts, to_sentiment_alert,
};
use crate::services::impact_service::{classify_impact, portfolio_weight};
use crate::services::sentiment_classifier::TextSentimentClassifier;
use crate::services::sentiment_history::SentimentHistoryStore;
use crate::services::sentiment_service::{aggregate, score_articles};

// Representative symbols per sector used for sector news
const SECTOR_SYMBOLS_PER_HOLDING: usize = 3;

/// Everything fetched from outside for one holding.
#[derive(Debug, Clone)]
pub struct HoldingInputs {
    pub holding: Holding,
    pub quote: Quote,
    pub profile: CompanyProfile,
    pub news: Vec<NewsArticle>,
    pub sector_news: Vec<SectorArticle>,
}

impl HoldingInputs {
    pub fn position_value(&self) -> f64 {
        self.quote.current * self.holding.quantity as f64
    }
}

/// Fetch quotes, profiles and news for every holding.
///
/// Fetch failures never abort the evaluation: a missing quote degrades to the
/// purchase price with no previous close, missing news to no articles.
pub async fn gather_inputs(
    provider: &dyn MarketDataProvider,
    holdings: Vec<Holding>,
    config: &SentimentConfig,
) -> Vec<HoldingInputs> {
    let mut inputs = Vec::with_capacity(holdings.len());

    for holding in holdings {
        let symbol = holding.symbol.clone();

        let quote = match provider.fetch_quote(&symbol).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("No quote for {}: {}. Using purchase price.", symbol, e);
                Quote {
                    symbol: symbol.clone(),
                    current: holding.purchase_price,
                    previous_close: None,
                    volume: None,
                }
            }
        };

        let profile = provider.fetch_company_profile(&symbol).await.unwrap_or_else(|e| {
            debug!("No profile for {}: {}", symbol, e);
            CompanyProfile {
                symbol: symbol.clone(),
                ..Default::default()
            }
        });

        let news = provider
            .fetch_company_news(&symbol, config.news_per_holding)
            .await
            .unwrap_or_else(|e| {
                warn!("No news for {}: {}", symbol, e);
                Vec::new()
            });

        let sector = profile.sector().to_string();
        let mut sector_news = Vec::new();
        for sector_symbol in symbols_for_sector(&sector, SECTOR_SYMBOLS_PER_HOLDING) {
            match provider
                .fetch_company_news(sector_symbol, config.sector_news_per_symbol)
                .await
            {
                Ok(articles) => sector_news.extend(articles.into_iter().map(|article| SectorArticle {
                    article,
                    sector: sector.clone(),
                    symbol: sector_symbol.to_string(),
                })),
                Err(e) => debug!("No sector news for {} ({}): {}", sector_symbol, sector, e),
            }
        }

        inputs.push(HoldingInputs {
            holding,
            quote,
            profile,
            news,
            sector_news,
        });
    }

    inputs
}

/// Runs the per-holding sentiment pipeline against the injected classifier
/// and history store. Used by both the dashboard route and the monitor job.
#[derive(Clone)]
pub struct SentimentEngine {
    classifier: Arc<dyn TextSentimentClassifier>,
    history: Arc<dyn SentimentHistoryStore>,
    lookback: Duration,
}

impl SentimentEngine {
    pub fn new(
        classifier: Arc<dyn TextSentimentClassifier>,
        history: Arc<dyn SentimentHistoryStore>,
        lookback: Duration,
    ) -> Self {
        Self {
            classifier,
            history,
            lookback,
        }
    }

    pub fn history(&self) -> &Arc<dyn SentimentHistoryStore> {
        &self.history
    }

    /// Evaluate every holding in order and fold the rows into a summary.
    pub async fn evaluate_portfolio(
        &self,
        owner: Uuid,
        inputs: Vec<HoldingInputs>,
        now: DateTime<Utc>,
    ) -> Dashboard {
        let total_value: f64 = inputs.iter().map(|i| i.position_value()).sum();

        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            rows.push(self.evaluate_holding(owner, input, total_value, now).await);
        }

        let summary = summarize(&rows, total_value);
        info!(
            "Evaluated {} holdings for {}: {} positive, {} negative, {} neutral, {} alerts",
            rows.len(),
            owner,
            summary.counts.positive,
            summary.counts.negative,
            summary.counts.neutral,
            summary.alert_count
        );

        Dashboard {
            rows,
            summary,
            generated_at: now,
        }
    }

    /// One holding: sentiment, alert decision against history, snapshot
    /// write, price targets, impact. The history read happens before the
    /// write so a cycle never compares against itself.
    pub async fn evaluate_holding(
        &self,
        owner: Uuid,
        input: HoldingInputs,
        total_value: f64,
        now: DateTime<Utc>,
    ) -> DashboardRow {
        let HoldingInputs {
            holding,
            quote,
            profile,
            news,
            sector_news,
        } = input;

        let symbol = holding.symbol.clone();
        let sector = profile.sector().to_string();
        let price = quote.current;
        let change = quote.change();
        let change_percent = quote.change_percent();

        let scored = score_articles(
            self.classifier.as_ref(),
            &symbol,
            &sector,
            news,
            Some(change),
            change_percent,
        )
        .await;
        let classes: Vec<SentimentClass> = scored.iter().map(|a| a.sentiment).collect();
        let sentiment = aggregate(&classes, change);

        let cutoff = lookback_cutoff(now, self.lookback);
        let previous = match self.history.latest_since(&symbol, owner, cutoff).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Could not read sentiment history for {}: {}", symbol, e);
                None
            }
        };

        let decision = decide(previous.as_ref(), sentiment.score, sentiment.class);
        let sentiment_alert = to_sentiment_alert(&decision, sentiment.score);

        let snapshot = NewSentimentSnapshot::new(&symbol, owner, sentiment.score, sentiment.class, now);
        if let Err(e) = self.history.record(snapshot).await {
            warn!("Could not record sentiment snapshot for {}: {}", symbol, e);
        }

        let mut alerts = Vec::new();
        if let Some(alert) = &sentiment_alert {
            alerts.push(alert.reason.clone());
        }
        alerts.extend(negative_headline_alerts(&scored));
        alerts.extend(price_target_alerts(price, holding.target_up, holding.target_dn));

        let position_value = price * holding.quantity as f64;
        let gain_percent = holding.gain_percent(price);
        let impact_level = classify_impact(holding.quantity, gain_percent, total_value, position_value);

        DashboardRow {
            name: profile.name.clone().unwrap_or_else(|| symbol.clone()),
            symbol,
            sector,
            price,
            change,
            change_percent,
            quantity: holding.quantity,
            position_value,
            portfolio_weight: portfolio_weight(position_value, total_value),
            gain_percent,
            sentiment_class: sentiment.class,
            sentiment_text: sentiment.class.label().to_string(),
            sentiment_score: sentiment.score,
            sentiment_alert,
            alerts,
            impact_level,
            target_up: holding.target_up,
            target_dn: holding.target_dn,
            news: scored,
            sector_news,
        }
    }
}

/// Load a user's holdings, fetch their inputs and evaluate them now.
/// Shared by the dashboard route and the background monitor.
pub async fn evaluate_for_user(
    pool: &PgPool,
    provider: &dyn MarketDataProvider,
    engine: &SentimentEngine,
    config: &SentimentConfig,
    owner: Uuid,
) -> Result<Dashboard, AppError> {
    let holdings = db::holding_queries::fetch_for_user(pool, owner).await?;
    let inputs = gather_inputs(provider, holdings, config).await;
    Ok(engine.evaluate_portfolio(owner, inputs, Utc::now()).await)
}

fn summarize(rows: &[DashboardRow], total_value: f64) -> PortfolioSummary {
    let mut counts = SentimentCounts::default();
    for row in rows {
        counts.record(row.sentiment_class);
    }

    let mood = counts.mood();
    PortfolioSummary {
        counts,
        total_value,
        mood,
        message: summary_message(mood).to_string(),
        alert_count: rows.iter().map(|r| r.alerts.len()).sum(),
    }
}

pub fn summary_message(mood: SentimentClass) -> &'static str {
    match mood {
        SentimentClass::Positive => {
            "📈 Your stocks are showing overall positive sentiment. It might be a good time to hold or sell at profit."
        }
        SentimentClass::Negative => {
            "📉 Your stocks are showing overall negative sentiment. Consider reviewing your portfolio to prevent potential loss."
        }
        SentimentClass::Neutral => "➖ Your stocks are showing overall neutral sentiment. Monitor for changes.",
    }
}

/// Sentiment alerts fired in this evaluation, by symbol.
pub fn fired_sentiment_alerts(dashboard: &Dashboard) -> Vec<(String, SentimentAlert)> {
    dashboard
        .rows
        .iter()
        .filter_map(|row| row.sentiment_alert.clone().map(|alert| (row.symbol.clone(), alert)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImpactLevel, SentimentAlertKind};
    use crate::services::sentiment_classifier::KeywordClassifier;
    use crate::services::sentiment_history::InMemorySentimentHistoryStore;

    fn engine(history: Arc<InMemorySentimentHistoryStore>) -> SentimentEngine {
        SentimentEngine::new(Arc::new(KeywordClassifier::default()), history, Duration::hours(24))
    }

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            description: String::new(),
            url: "#".to_string(),
            source: "Test".to_string(),
            published_at: Utc::now(),
        }
    }

    fn inputs(owner: Uuid, symbol: &str, price: f64, previous_close: Option<f64>, news: Vec<NewsArticle>) -> HoldingInputs {
        HoldingInputs {
            holding: Holding::new(owner, symbol.to_string(), 10, 100.0),
            quote: Quote {
                symbol: symbol.to_string(),
                current: price,
                previous_close,
                volume: None,
            },
            profile: CompanyProfile {
                symbol: symbol.to_string(),
                name: Some(format!("{} Inc.", symbol)),
                industry: Some("Technology".to_string()),
                ..Default::default()
            },
            news,
            sector_news: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_first_evaluation_records_without_alert() {
        let history = Arc::new(InMemorySentimentHistoryStore::new());
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let dashboard = engine(history.clone())
            .evaluate_portfolio(owner, vec![inputs(owner, "AAPL", 100.0, Some(100.0), vec![article("Apple shares crash")])], now)
            .await;

        let row = &dashboard.rows[0];
        assert_eq!(row.sentiment_class, SentimentClass::Negative);
        assert!(row.sentiment_alert.is_none());
        assert_eq!(row.alerts, vec!["⚠️ Negative sentiment: \"Apple shares crash...\"".to_string()]);
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_second_evaluation_alerts_against_previous() {
        let history = Arc::new(InMemorySentimentHistoryStore::new());
        let owner = Uuid::new_v4();
        let engine = engine(history.clone());
        let now = Utc::now();

        engine
            .evaluate_portfolio(owner, vec![inputs(owner, "AAPL", 100.0, Some(100.0), vec![article("Apple posts record profit")])], now - Duration::minutes(5))
            .await;

        let dashboard = engine
            .evaluate_portfolio(owner, vec![inputs(owner, "AAPL", 100.0, Some(100.0), vec![article("Apple shares crash")])], now)
            .await;

        let alert = dashboard.rows[0].sentiment_alert.as_ref().unwrap();
        assert_eq!(alert.kind, SentimentAlertKind::PositiveToNegative);
        assert_eq!(dashboard.summary.alert_count, 2);
        assert_eq!(fired_sentiment_alerts(&dashboard).len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_no_news_falls_back_to_price_sign() {
        let history = Arc::new(InMemorySentimentHistoryStore::new());
        let owner = Uuid::new_v4();

        let dashboard = engine(history)
            .evaluate_portfolio(owner, vec![inputs(owner, "MSFT", 102.0, Some(100.0), Vec::new())], Utc::now())
            .await;

        let row = &dashboard.rows[0];
        assert_eq!(row.sentiment_score, 0.5);
        assert_eq!(row.sentiment_class, SentimentClass::Positive);
        assert_eq!(row.sentiment_text, "📈 Positive");
        assert_eq!(dashboard.summary.mood, SentimentClass::Positive);
        assert_eq!(dashboard.summary.message, summary_message(SentimentClass::Positive));
    }

    #[tokio::test]
    async fn test_targets_impact_and_totals() {
        let history = Arc::new(InMemorySentimentHistoryStore::new());
        let owner = Uuid::new_v4();

        let mut big = inputs(owner, "AAPL", 120.0, None, Vec::new());
        big.holding.quantity = 50;
        big.holding = big.holding.with_targets(Some(110.0), Some(125.0));
        let small = inputs(owner, "MSFT", 100.0, None, Vec::new());

        let dashboard = engine(history)
            .evaluate_portfolio(owner, vec![big, small], Utc::now())
            .await;

        assert_eq!(dashboard.summary.total_value, 50.0 * 120.0 + 10.0 * 100.0);
        assert_eq!(dashboard.summary.counts.neutral, 2);
        assert_eq!(dashboard.summary.mood, SentimentClass::Neutral);

        let big_row = &dashboard.rows[0];
        assert_eq!(big_row.alerts.len(), 2);
        assert_eq!(big_row.impact_level, ImpactLevel::Large);
        assert!((big_row.portfolio_weight - 6000.0 / 7000.0).abs() < 1e-9);
        assert_eq!(dashboard.rows[1].impact_level, ImpactLevel::Small);
    }

    #[test]
    fn test_summary_messages() {
        assert!(summary_message(SentimentClass::Negative).contains("negative"));
        assert!(summary_message(SentimentClass::Neutral).contains("Monitor for changes"));

        // same marker as the row label
        for class in [SentimentClass::Positive, SentimentClass::Negative, SentimentClass::Neutral] {
            let marker = class.label().split(' ').next().unwrap();
            assert!(summary_message(class).starts_with(marker), "{:?}", class);
        }
    }
}
