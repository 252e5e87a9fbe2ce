//! Tracing setup: console output always, Loki shipping behind the `loki`
//! feature when `LOKI_ENABLED=true`.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info,tower_http=info,sqlx=warn";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("LOKI_ENABLED is true but LOKI_URL is not set")]
    MissingLokiUrl,
    #[error("invalid LOKI_URL '{url}': {source}")]
    InvalidLokiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid log filter '{0}'")]
    InvalidFilter(String),
    #[error("loki layer: {0}")]
    Loki(String),
    #[error("subscriber already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable or empty values fall back to defaults; logging must come
    /// up before the rest of the configuration is read.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            loki_enabled: non_empty("LOKI_ENABLED")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false),
            loki_url: non_empty("LOKI_URL"),
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| "sentifolio".to_string()),
            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: non_empty("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// The Loki endpoint to ship to, if Loki is enabled.
    pub fn loki_endpoint(&self) -> Result<Option<url::Url>, LoggingError> {
        if !self.loki_enabled {
            return Ok(None);
        }

        let raw = self.loki_url.as_deref().ok_or(LoggingError::MissingLokiUrl)?;
        url::Url::parse(raw)
            .map(Some)
            .map_err(|source| LoggingError::InvalidLokiUrl {
                url: raw.to_string(),
                source,
            })
    }

    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.log_level).map_err(|_| LoggingError::InvalidFilter(self.log_level.clone()))
    }
}

pub fn init_logging(config: LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;
    let endpoint = config.loki_endpoint()?;

    #[cfg(feature = "loki")]
    {
        if let Some(url) = endpoint {
            return init_with_loki(&config, filter, url);
        }
    }
    #[cfg(not(feature = "loki"))]
    {
        if endpoint.is_some() {
            eprintln!("LOKI_ENABLED is set but the binary was built without the `loki` feature");
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        "📊 Console logging initialized (filter: {})",
        config.log_level
    );
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: &LoggingConfig, filter: EnvFilter, url: url::Url) -> Result<(), LoggingError> {
    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)
        .and_then(|b| b.label("environment", &config.environment))
        .and_then(|b| b.build_url(url.clone()))
        .map_err(|e| LoggingError::Loki(e.to_string()))?;

    // Ships buffered log lines to Loki in the background
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()?;

    tracing::info!("✅ Loki logging initialized at {}", url);
    Ok(())
}
