//! Medicine catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A medicine in the hospital pharmacy catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    /// Unit of measure (tablet, bottle, vial, ...)
    pub unit: String,
    /// Default counter sale price per unit
    pub sale_price: Decimal,
    /// Quantity-weighted average cost across all purchased stock,
    /// recomputed on every purchase
    pub average_buy_price: Decimal,
    /// Cached units on hand across batches
    pub total_stock: Decimal,
    /// Stock level at or below which the medicine is flagged for reorder
    pub reorder_level: Decimal,
    /// Optimistic concurrency token
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    pub fn is_low_stock(&self) -> bool {
        self.total_stock <= self.reorder_level
    }
}
