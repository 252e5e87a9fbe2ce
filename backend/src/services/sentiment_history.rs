use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{NewSentimentSnapshot, SentimentHistoryRow, SentimentSnapshot};

/// Append-only store of sentiment snapshots per (symbol, owner).
///
/// A writer must see its own write on the next read: `latest_since` right
/// after `record` returns the record just written.
#[async_trait]
pub trait SentimentHistoryStore: Send + Sync {
    /// Most recent snapshot strictly newer than `since`.
    async fn latest_since(
        &self,
        symbol: &str,
        owner: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<SentimentSnapshot>, AppError>;

    async fn record(&self, snapshot: NewSentimentSnapshot) -> Result<SentimentSnapshot, AppError>;

    /// Newest first, at most `limit` snapshots.
    async fn history(
        &self,
        symbol: &str,
        owner: Uuid,
        limit: i64,
    ) -> Result<Vec<SentimentSnapshot>, AppError>;
}

fn from_row(row: SentimentHistoryRow) -> Result<SentimentSnapshot, AppError> {
    SentimentSnapshot::try_from(row).map_err(|e| AppError::Db(sqlx::Error::Decode(e.into())))
}

// ==============================================================================
// Postgres
// ==============================================================================

#[derive(Clone)]
pub struct PgSentimentHistoryStore {
    pool: PgPool,
}

impl PgSentimentHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SentimentHistoryStore for PgSentimentHistoryStore {
    async fn latest_since(
        &self,
        symbol: &str,
        owner: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<SentimentSnapshot>, AppError> {
        let row = db::sentiment_history_queries::fetch_latest_since(&self.pool, symbol, owner, since).await?;
        row.map(from_row).transpose()
    }

    async fn record(&self, snapshot: NewSentimentSnapshot) -> Result<SentimentSnapshot, AppError> {
        let row = db::sentiment_history_queries::insert(&self.pool, &snapshot).await?;
        from_row(row)
    }

    async fn history(
        &self,
        symbol: &str,
        owner: Uuid,
        limit: i64,
    ) -> Result<Vec<SentimentSnapshot>, AppError> {
        let rows = db::sentiment_history_queries::fetch_recent(&self.pool, symbol, owner, limit).await?;
        rows.into_iter().map(from_row).collect()
    }
}

// ==============================================================================
// In-memory
// ==============================================================================

/// Process-local history, used by tests and when no database-backed history
/// is wanted. Snapshots per key are kept sorted by timestamp.
#[derive(Clone, Default)]
pub struct InMemorySentimentHistoryStore {
    entries: Arc<DashMap<(String, Uuid), Vec<SentimentSnapshot>>>,
}

impl InMemorySentimentHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SentimentHistoryStore for InMemorySentimentHistoryStore {
    async fn latest_since(
        &self,
        symbol: &str,
        owner: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<SentimentSnapshot>, AppError> {
        Ok(self
            .entries
            .get(&(symbol.to_string(), owner))
            .and_then(|snapshots| snapshots.iter().rev().find(|s| s.timestamp > since).cloned()))
    }

    async fn record(&self, snapshot: NewSentimentSnapshot) -> Result<SentimentSnapshot, AppError> {
        let mut series = self
            .entries
            .entry((snapshot.symbol.clone(), snapshot.owner))
            .or_default();

        if series.iter().any(|s| s.timestamp == snapshot.timestamp) {
            return Err(AppError::Conflict(format!(
                "Sentiment snapshot for {} at {} already exists",
                snapshot.symbol, snapshot.timestamp
            )));
        }

        let stored = SentimentSnapshot {
            id: Uuid::new_v4(),
            symbol: snapshot.symbol,
            owner: snapshot.owner,
            score: snapshot.score,
            class: snapshot.class,
            timestamp: snapshot.timestamp,
        };

        let pos = series.partition_point(|s| s.timestamp < stored.timestamp);
        series.insert(pos, stored.clone());
        Ok(stored)
    }

    async fn history(
        &self,
        symbol: &str,
        owner: Uuid,
        limit: i64,
    ) -> Result<Vec<SentimentSnapshot>, AppError> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        Ok(self
            .entries
            .get(&(symbol.to_string(), owner))
            .map(|snapshots| snapshots.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
