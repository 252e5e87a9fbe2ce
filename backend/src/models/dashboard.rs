use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ScoredArticle, SectorArticle, SentimentAlert, SentimentClass};

/// Coarse weight of a holding in the portfolio
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Small,
    Mid,
    Large,
}

/// One evaluated holding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardRow {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: Option<f64>,
    pub quantity: i32,
    pub position_value: f64,
    pub portfolio_weight: f64,
    pub gain_percent: Option<f64>,
    pub sentiment_class: SentimentClass,
    pub sentiment_text: String,
    pub sentiment_score: f64,
    pub sentiment_alert: Option<SentimentAlert>,
    pub alerts: Vec<String>,
    pub impact_level: ImpactLevel,
    pub target_up: Option<f64>,
    pub target_dn: Option<f64>,
    pub news: Vec<ScoredArticle>,
    pub sector_news: Vec<SectorArticle>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentCounts {
    pub fn record(&mut self, class: SentimentClass) {
        match class {
            SentimentClass::Positive => self.positive += 1,
            SentimentClass::Negative => self.negative += 1,
            SentimentClass::Neutral => self.neutral += 1,
        }
    }

    /// Overall mood: positive vs negative majority, neutral on a tie.
    pub fn mood(&self) -> SentimentClass {
        if self.positive > self.negative {
            SentimentClass::Positive
        } else if self.negative > self.positive {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub counts: SentimentCounts,
    pub total_value: f64,
    pub mood: SentimentClass,
    pub message: String,
    pub alert_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub rows: Vec<DashboardRow>,
    pub summary: PortfolioSummary,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_majority_and_tie() {
        let mut counts = SentimentCounts::default();
        assert_eq!(counts.mood(), SentimentClass::Neutral);

        counts.record(SentimentClass::Positive);
        counts.record(SentimentClass::Neutral);
        counts.record(SentimentClass::Neutral);
        assert_eq!(counts.mood(), SentimentClass::Positive);

        counts.record(SentimentClass::Negative);
        assert_eq!(counts.mood(), SentimentClass::Neutral);

        counts.record(SentimentClass::Negative);
        assert_eq!(counts.mood(), SentimentClass::Negative);
        assert_eq!(counts, SentimentCounts { positive: 1, negative: 2, neutral: 2 });
    }
}
