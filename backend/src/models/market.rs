use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::NewsArticle;

/// Latest quote for a symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub current: f64,
    pub previous_close: Option<f64>,
    pub volume: Option<f64>,
}

impl Quote {
    /// Absolute change against the previous close, 0 when unknown.
    pub fn change(&self) -> f64 {
        match self.previous_close {
            Some(pc) if pc > 0.0 && self.current > 0.0 => self.current - pc,
            _ => 0.0,
        }
    }

    /// Day gain in percent, `None` when the previous close is unknown.
    pub fn change_percent(&self) -> Option<f64> {
        match self.previous_close {
            Some(pc) if pc > 0.0 && self.current > 0.0 => Some((self.current - pc) / pc * 100.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub logo: Option<String>,
}

impl CompanyProfile {
    pub fn sector(&self) -> &str {
        self.industry
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
    }
}

/// One row of the "top stocks" ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSummary {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub percent: f64,
    pub volume: Option<f64>,
    pub sector: String,
    pub market_cap: Option<f64>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub days: Option<u32>,
}

/// Landing page data: featured stocks plus general market news
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePage {
    pub featured: Vec<StockSummary>,
    pub news: Vec<NewsArticle>,
}
