use regex::Regex;
use sqlx::PgPool;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, UpdateHolding};

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9.\-]{1,10}$").expect("valid symbol regex"))
}

/// Upper-case and validate a ticker symbol.
pub fn normalize_symbol(raw: &str) -> Result<String, AppError> {
    let symbol = raw.trim().to_uppercase();
    if symbol_pattern().is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(AppError::Validation(format!("Invalid symbol '{}'", raw.trim())))
    }
}

fn validate_amounts(
    quantity: Option<i32>,
    purchase_price: Option<f64>,
    target_up: Option<f64>,
    target_dn: Option<f64>,
) -> Result<(), AppError> {
    if let Some(q) = quantity {
        if q <= 0 {
            return Err(AppError::Validation("Quantity must be positive".into()));
        }
    }
    if let Some(p) = purchase_price {
        if !p.is_finite() || p < 0.0 {
            return Err(AppError::Validation("Purchase price cannot be negative".into()));
        }
    }
    for target in [target_up, target_dn].into_iter().flatten() {
        if !target.is_finite() || target <= 0.0 {
            return Err(AppError::Validation("Price targets must be positive".into()));
        }
    }
    Ok(())
}

pub fn build_holding(user_id: Uuid, input: CreateHolding) -> Result<Holding, AppError> {
    let symbol = normalize_symbol(&input.symbol)?;
    validate_amounts(input.quantity, input.purchase_price, input.target_up, input.target_dn)?;

    Ok(Holding::new(
        user_id,
        symbol,
        input.quantity.unwrap_or(1),
        input.purchase_price.unwrap_or(0.0),
    )
    .with_targets(input.target_up, input.target_dn))
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateHolding) -> Result<Holding, AppError> {
    let holding = build_holding(user_id, input)?;
    match db::holding_queries::insert(pool, holding).await {
        Ok(holding) => Ok(holding),
        Err(e) => match AppError::from(e) {
            AppError::Conflict(_) => Err(AppError::Conflict("Holding already exists".to_string())),
            other => Err(other),
        },
    }
}

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<Holding>, AppError> {
    let holdings = db::holding_queries::fetch_for_user(pool, user_id).await?;
    Ok(holdings)
}

pub async fn update(pool: &PgPool, user_id: Uuid, id: Uuid, input: UpdateHolding) -> Result<Holding, AppError> {
    validate_amounts(input.quantity, input.purchase_price, input.target_up, input.target_dn)?;
    let holding = db::holding_queries::update(pool, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Holding not found".to_string()))?;
    Ok(holding)
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    match db::holding_queries::delete(pool, user_id, id).await? {
        0 => Err(AppError::NotFound("Holding not found".to_string())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input(symbol: &str, quantity: Option<i32>, price: Option<f64>) -> CreateHolding {
        CreateHolding {
            symbol: symbol.to_string(),
            quantity,
            purchase_price: price,
            target_up: None,
            target_dn: None,
        }
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("TOOLONGSYMBOL").is_err());
        assert!(normalize_symbol("AA PL").is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let holding = build_holding(Uuid::new_v4(), create_input("msft", None, None)).unwrap();
        assert_eq!(holding.symbol, "MSFT");
        assert_eq!(holding.quantity, 1);
        assert_eq!(holding.purchase_price, 0.0);
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        assert!(matches!(
            build_holding(Uuid::new_v4(), create_input("AAPL", Some(0), None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            build_holding(Uuid::new_v4(), create_input("AAPL", Some(5), Some(-1.0))),
            Err(AppError::Validation(_))
        ));

        let mut input = create_input("AAPL", Some(5), Some(10.0));
        input.target_dn = Some(0.0);
        assert!(build_holding(Uuid::new_v4(), input).is_err());
    }
}
