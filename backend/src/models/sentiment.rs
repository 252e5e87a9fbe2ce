use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Sentiment classification shared by articles, holdings and snapshots
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
}

impl SentimentClass {
    /// Fixed score used for one classified article (and for averaging).
    pub fn score(self) -> f64 {
        match self {
            SentimentClass::Positive => 0.8,
            SentimentClass::Neutral => 0.5,
            SentimentClass::Negative => 0.2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentClass::Positive => "positive",
            SentimentClass::Neutral => "neutral",
            SentimentClass::Negative => "negative",
        }
    }

    /// Classification purely from the sign of a price change.
    pub fn from_price_change(change: f64) -> Self {
        if change > 0.0 {
            SentimentClass::Positive
        } else if change < 0.0 {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        }
    }

    /// Display label used by the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            SentimentClass::Positive => "📈 Positive",
            SentimentClass::Neutral => "➖ Neutral",
            SentimentClass::Negative => "📉 Negative",
        }
    }
}

impl std::fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SentimentClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentClass::Positive),
            "neutral" => Ok(SentimentClass::Neutral),
            "negative" => Ok(SentimentClass::Negative),
            other => Err(format!("unknown sentiment class '{}'", other)),
        }
    }
}

/// One recorded sentiment observation for a (symbol, owner) pair.
/// Snapshots are append-only; nothing updates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentSnapshot {
    pub id: Uuid,
    pub symbol: String,
    pub owner: Uuid,
    pub score: f64,
    pub class: SentimentClass,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSentimentSnapshot {
    pub symbol: String,
    pub owner: Uuid,
    pub score: f64,
    pub class: SentimentClass,
    pub timestamp: DateTime<Utc>,
}

impl NewSentimentSnapshot {
    pub fn new(symbol: &str, owner: Uuid, score: f64, class: SentimentClass, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            owner,
            score: score.clamp(0.0, 1.0),
            class,
            timestamp,
        }
    }
}

// Storage row; the class lives in a TEXT column.
#[derive(Debug, Clone, FromRow)]
pub struct SentimentHistoryRow {
    pub id: Uuid,
    pub symbol: String,
    pub user_id: Uuid,
    pub sentiment_score: f64,
    pub sentiment_class: String,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<SentimentHistoryRow> for SentimentSnapshot {
    type Error = String;

    fn try_from(row: SentimentHistoryRow) -> Result<Self, Self::Error> {
        Ok(SentimentSnapshot {
            id: row.id,
            symbol: row.symbol,
            owner: row.user_id,
            score: row.sentiment_score,
            class: row.sentiment_class.parse()?,
            timestamp: row.recorded_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentHistoryParams {
    pub limit: Option<i64>,
}
