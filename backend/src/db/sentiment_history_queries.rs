use crate::models::{NewSentimentSnapshot, SentimentHistoryRow};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

// ==============================================================================
// Sentiment history (append-only)
// ==============================================================================

/// Most recent snapshot strictly newer than `since`.
pub async fn fetch_latest_since(
    pool: &PgPool,
    symbol: &str,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Option<SentimentHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, SentimentHistoryRow>(
        r#"
        SELECT id, symbol, user_id, sentiment_score, sentiment_class, recorded_at
        FROM sentiment_history
        WHERE symbol = $1 AND user_id = $2 AND recorded_at > $3
        ORDER BY recorded_at DESC
        LIMIT 1
        "#,
    )
    .bind(symbol)
    .bind(user_id)
    .bind(since)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, snapshot: &NewSentimentSnapshot) -> Result<SentimentHistoryRow, sqlx::Error> {
    sqlx::query_as::<_, SentimentHistoryRow>(
        r#"
        INSERT INTO sentiment_history (id, symbol, user_id, sentiment_score, sentiment_class, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, symbol, user_id, sentiment_score, sentiment_class, recorded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&snapshot.symbol)
    .bind(snapshot.owner)
    .bind(snapshot.score)
    .bind(snapshot.class.as_str())
    .bind(snapshot.timestamp)
    .fetch_one(pool)
    .await
}

pub async fn fetch_recent(
    pool: &PgPool,
    symbol: &str,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<SentimentHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, SentimentHistoryRow>(
        r#"
        SELECT id, symbol, user_id, sentiment_score, sentiment_class, recorded_at
        FROM sentiment_history
        WHERE symbol = $1 AND user_id = $2
        ORDER BY recorded_at DESC
        LIMIT $3
        "#,
    )
    .bind(symbol)
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
