//! Typed application configuration read from the environment (`.env` is
//! loaded by `main` through `dotenvy` before [`AppConfig::from_env`] runs).

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Keyword,
    Model,
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(ClassifierKind::Keyword),
            "model" => Ok(ClassifierKind::Model),
            other => Err(format!("unknown classifier '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub finnhub_api_key: Option<String>,
    pub cache_enabled: bool,
    pub cache_ttl_seconds: u64,
    pub request_timeout_seconds: u64,
}

// One year; also keeps chrono::Duration::hours far from its overflow point
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 365;
pub const MAX_MONITOR_INTERVAL_MINUTES: u64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct SentimentConfig {
    pub classifier: ClassifierKind,
    pub model_url: String,
    pub model_api_key: Option<String>,
    pub negative_keywords: Option<Vec<String>>,
    pub positive_keywords: Option<Vec<String>>,
    pub lookback_hours: i64,
    pub news_per_holding: usize,
    pub sector_news_per_symbol: usize,
}

impl SentimentConfig {
    /// How far back a previous snapshot may lie and still be compared.
    pub fn lookback_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookback_hours.clamp(1, MAX_LOOKBACK_HOURS))
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: String,
    pub from_name: String,
    /// Where dashboard summaries and monitor alerts are delivered.
    pub recipient: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub monitor_interval_minutes: u64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ServerConfig,
    pub market_data: MarketDataConfig,
    pub sentiment: SentimentConfig,
    pub mail: MailConfig,
    pub scheduler: SchedulerConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests do not
    /// have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url,
            server: ServerConfig {
                host: [0, 0, 0, 0],
                port: parse_or(&lookup, "PORT", 3000)?,
            },
            market_data: MarketDataConfig {
                finnhub_api_key: lookup("FINNHUB_API_KEY").filter(|k| !k.is_empty()),
                cache_enabled: parse_or(&lookup, "CACHE_ENABLED", true)?,
                cache_ttl_seconds: parse_or(&lookup, "CACHE_TTL_SECONDS", 300)?,
                request_timeout_seconds: parse_or(&lookup, "MARKET_DATA_TIMEOUT_SECONDS", 10)?,
            },
            sentiment: SentimentConfig {
                classifier: parse_or(&lookup, "SENTIMENT_CLASSIFIER", ClassifierKind::Keyword)?,
                model_url: lookup("SENTIMENT_MODEL_URL").unwrap_or_else(|| {
                    "https://api-inference.huggingface.co/models/distilbert/distilbert-base-uncased-finetuned-sst-2-english".to_string()
                }),
                model_api_key: lookup("SENTIMENT_MODEL_API_KEY"),
                negative_keywords: lookup("SENTIMENT_NEGATIVE_KEYWORDS").map(|v| split_list(&v)),
                positive_keywords: lookup("SENTIMENT_POSITIVE_KEYWORDS").map(|v| split_list(&v)),
                lookback_hours: parse_in_range(&lookup, "SENTIMENT_LOOKBACK_HOURS", 24, 1..=MAX_LOOKBACK_HOURS)?,
                news_per_holding: parse_or(&lookup, "NEWS_PER_HOLDING", 2)?,
                sector_news_per_symbol: parse_or(&lookup, "SECTOR_NEWS_PER_SYMBOL", 1)?,
            },
            mail: MailConfig {
                smtp_enabled: parse_or(&lookup, "SMTP_ENABLED", false)?,
                smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                smtp_port: parse_or(&lookup, "SMTP_PORT", 587)?,
                smtp_username: lookup("SMTP_USERNAME"),
                smtp_password: lookup("SMTP_PASSWORD"),
                from_email: lookup("SMTP_FROM_EMAIL").unwrap_or_else(|| "alerts@sentifolio.local".to_string()),
                from_name: lookup("SMTP_FROM_NAME").unwrap_or_else(|| "Sentifolio".to_string()),
                recipient: lookup("NOTIFY_EMAIL").filter(|v| !v.is_empty()),
            },
            scheduler: SchedulerConfig {
                enabled: parse_or(&lookup, "MONITOR_ENABLED", true)?,
                monitor_interval_minutes: parse_in_range(
                    &lookup,
                    "MONITOR_INTERVAL_MINUTES",
                    5,
                    1..=MAX_MONITOR_INTERVAL_MINUTES,
                )?,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours: parse_or(&lookup, "TOKEN_TTL_HOURS", 12)?,
                admin_username: lookup("ADMIN_USERNAME"),
                admin_password: lookup("ADMIN_PASSWORD"),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

fn parse_in_range<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display,
{
    let value = parse_or(lookup, key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/sentifolio"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.sentiment.classifier, ClassifierKind::Keyword);
        assert_eq!(config.sentiment.lookback_hours, 24);
        assert_eq!(config.sentiment.news_per_holding, 2);
        assert_eq!(config.scheduler.monitor_interval_minutes, 5);
        assert_eq!(config.market_data.cache_ttl_seconds, 300);
        assert!(config.market_data.cache_enabled);
        assert!(!config.mail.smtp_enabled);
        assert!(config.mail.recipient.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/sentifolio"),
            ("JWT_SECRET", "secret"),
            ("SENTIMENT_CLASSIFIER", "magic"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SENTIMENT_CLASSIFIER", .. }));
    }

    #[test]
    fn test_keyword_overrides_are_normalized() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/sentifolio"),
            ("JWT_SECRET", "secret"),
            ("SENTIMENT_NEGATIVE_KEYWORDS", "Lawsuit, recall ,,"),
        ]))
        .unwrap();
        assert_eq!(
            config.sentiment.negative_keywords,
            Some(vec!["lawsuit".to_string(), "recall".to_string()])
        );
        assert!(config.sentiment.positive_keywords.is_none());
    }

    fn with_base(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let mut pairs = vec![
            ("DATABASE_URL", "postgres://localhost/sentifolio"),
            ("JWT_SECRET", "secret"),
        ];
        pairs.extend_from_slice(extra);
        AppConfig::from_lookup(lookup_from(&pairs))
    }

    #[test]
    fn test_lookback_hours_must_be_positive_and_bounded() {
        let max = i64::MAX.to_string();
        for bad in ["0", "-24", max.as_str()] {
            let err = with_base(&[("SENTIMENT_LOOKBACK_HOURS", bad)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "SENTIMENT_LOOKBACK_HOURS", .. }),
                "{} should be rejected",
                bad
            );
        }

        let config = with_base(&[("SENTIMENT_LOOKBACK_HOURS", "168")]).unwrap();
        assert_eq!(config.sentiment.lookback_window(), chrono::Duration::hours(168));
    }

    #[test]
    fn test_lookback_window_never_empty() {
        let mut sentiment = with_base(&[]).unwrap().sentiment;
        assert_eq!(sentiment.lookback_window(), chrono::Duration::hours(24));

        sentiment.lookback_hours = 0;
        assert_eq!(sentiment.lookback_window(), chrono::Duration::hours(1));

        sentiment.lookback_hours = i64::MAX;
        assert_eq!(sentiment.lookback_window(), chrono::Duration::hours(MAX_LOOKBACK_HOURS));
    }

    #[test]
    fn test_monitor_interval_is_bounded() {
        for bad in ["0", "1441", "18446744073709551615"] {
            let err = with_base(&[("MONITOR_INTERVAL_MINUTES", bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "MONITOR_INTERVAL_MINUTES", .. }));
        }

        let config = with_base(&[("MONITOR_INTERVAL_MINUTES", "60")]).unwrap();
        assert_eq!(config.scheduler.monitor_interval_minutes, 60);
    }
}
