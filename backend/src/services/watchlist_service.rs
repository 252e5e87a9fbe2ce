use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{AddWatchlistItem, WatchlistItem};
use crate::services::holding_service::normalize_symbol;

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<WatchlistItem>, AppError> {
    let items = db::watchlist_queries::fetch_for_user(pool, user_id).await?;
    Ok(items)
}

pub async fn add(pool: &PgPool, user_id: Uuid, input: AddWatchlistItem) -> Result<WatchlistItem, AppError> {
    let symbol = normalize_symbol(&input.symbol)?;
    match db::watchlist_queries::insert(pool, user_id, &symbol).await {
        Ok(item) => Ok(item),
        Err(e) => match AppError::from(e) {
            AppError::Conflict(_) => Err(AppError::Conflict(format!("{} is already on the watchlist", symbol))),
            other => Err(other),
        },
    }
}

pub async fn remove(pool: &PgPool, user_id: Uuid, symbol: &str) -> Result<(), AppError> {
    let symbol = normalize_symbol(symbol)?;
    match db::watchlist_queries::delete(pool, user_id, &symbol).await? {
        0 => Err(AppError::NotFound(format!("{} is not on the watchlist", symbol))),
        _ => Ok(()),
    }
}
