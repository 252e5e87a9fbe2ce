use crate::models::WatchlistItem;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn fetch_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<WatchlistItem>, sqlx::Error> {
    sqlx::query_as::<_, WatchlistItem>(
        r#"
        SELECT id, user_id, symbol, created_at
        FROM watchlist
        WHERE user_id = $1
        ORDER BY symbol
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn insert(pool: &PgPool, user_id: Uuid, symbol: &str) -> Result<WatchlistItem, sqlx::Error> {
    sqlx::query_as::<_, WatchlistItem>(
        r#"
        INSERT INTO watchlist (id, user_id, symbol)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, symbol, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(symbol)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: Uuid, symbol: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM watchlist WHERE user_id = $1 AND symbol = $2")
        .bind(user_id)
        .bind(symbol)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
