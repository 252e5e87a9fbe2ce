use crate::models::User;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn fetch_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, username: &str, password_hash: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

/// Users that own at least one holding, for the background monitor.
pub async fn fetch_with_holdings(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.password_hash, u.created_at
        FROM users u
        WHERE EXISTS (SELECT 1 FROM holdings h WHERE h.user_id = u.id)
        ORDER BY u.username
        "#,
    )
    .fetch_all(pool)
    .await
}
