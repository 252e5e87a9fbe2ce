use crate::models::{Holding, UpdateHolding};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn fetch_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Holding>, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        r#"
        SELECT id, user_id, symbol, quantity, purchase_price, target_up, target_dn, created_at
        FROM holdings
        WHERE user_id = $1
        ORDER BY created_at, symbol
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Holding>, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        r#"
        SELECT id, user_id, symbol, quantity, purchase_price, target_up, target_dn, created_at
        FROM holdings
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, holding: Holding) -> Result<Holding, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        r#"
        INSERT INTO holdings (id, user_id, symbol, quantity, purchase_price, target_up, target_dn, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, symbol, quantity, purchase_price, target_up, target_dn, created_at
        "#,
    )
    .bind(holding.id)
    .bind(holding.user_id)
    .bind(holding.symbol)
    .bind(holding.quantity)
    .bind(holding.purchase_price)
    .bind(holding.target_up)
    .bind(holding.target_dn)
    .bind(holding.created_at)
    .fetch_one(pool)
    .await
}

/// Fields left as `None` keep their stored value, except the targets which
/// are replaced as given.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &UpdateHolding,
) -> Result<Option<Holding>, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        r#"
        UPDATE holdings
        SET quantity = COALESCE($3, quantity),
            purchase_price = COALESCE($4, purchase_price),
            target_up = $5,
            target_dn = $6
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, symbol, quantity, purchase_price, target_up, target_dn, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(input.quantity)
    .bind(input.purchase_price)
    .bind(input.target_up)
    .bind(input.target_dn)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM holdings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
