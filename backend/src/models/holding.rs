use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A stock held by one user, with optional price targets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Holding {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub quantity: i32,
    pub purchase_price: f64,
    pub target_up: Option<f64>,
    pub target_dn: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Holding {
    pub fn new(user_id: Uuid, symbol: String, quantity: i32, purchase_price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            symbol,
            quantity,
            purchase_price,
            target_up: None,
            target_dn: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_targets(mut self, target_up: Option<f64>, target_dn: Option<f64>) -> Self {
        self.target_up = target_up;
        self.target_dn = target_dn;
        self
    }

    /// Gain since purchase in percent; `None` when no purchase price is known.
    pub fn gain_percent(&self, price: f64) -> Option<f64> {
        if self.purchase_price > 0.0 {
            Some((price - self.purchase_price) / self.purchase_price * 100.0)
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateHolding {
    pub symbol: String,
    pub quantity: Option<i32>,
    pub purchase_price: Option<f64>,
    pub target_up: Option<f64>,
    pub target_dn: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateHolding {
    pub quantity: Option<i32>,
    pub purchase_price: Option<f64>,
    pub target_up: Option<f64>,
    pub target_dn: Option<f64>,
}
