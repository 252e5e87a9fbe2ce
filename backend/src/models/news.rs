use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SentimentClass;

/// A single news article as returned by the market data provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
}

impl NewsArticle {
    /// Text fed to the sentiment classifier.
    pub fn sentiment_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// An article after classification, as shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub sentiment: SentimentClass,
    pub sentiment_score: f64,
    pub symbol: String,
    pub sector: String,
}

/// Sector news attached to a dashboard row (not scored)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorArticle {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub sector: String,
    pub symbol: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_text_joins_title_and_description() {
        let article = NewsArticle {
            title: "Apple beats estimates".to_string(),
            description: "Revenue grew".to_string(),
            url: "#".to_string(),
            source: "Reuters".to_string(),
            published_at: Utc::now(),
        };
        assert_eq!(article.sentiment_text(), "Apple beats estimates Revenue grew");
    }
}
