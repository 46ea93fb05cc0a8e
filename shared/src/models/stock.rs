//! Stock batch models

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{PaymentMethod, PaymentStatus};

/// A purchased lot of a medicine with its own cost, expiry, and
/// remaining quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBatch {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub medicine_id: Uuid,
    pub vendor_id: Uuid,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    /// Units originally purchased
    pub quantity: Decimal,
    /// Units remaining, decremented by sales
    pub available_quantity: Decimal,
    /// Unit cost for this batch
    pub buy_price: Decimal,
    pub sale_price: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub purchase_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockBatch {
    /// `quantity × buy_price`
    pub fn total_purchase_amount(&self) -> Decimal {
        self.quantity * self.buy_price
    }

    /// Units already sold out of this batch
    pub fn sold_quantity(&self) -> Decimal {
        self.quantity - self.available_quantity
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        !self.is_expired(today) && self.expiry_date <= today + Duration::days(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn batch(quantity: &str, available: &str, buy_price: &str, expiry: NaiveDate) -> StockBatch {
        StockBatch {
            id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            medicine_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            batch_number: "B-001".to_string(),
            expiry_date: expiry,
            quantity: Decimal::from_str(quantity).unwrap(),
            available_quantity: Decimal::from_str(available).unwrap(),
            buy_price: Decimal::from_str(buy_price).unwrap(),
            sale_price: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            due_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Cash,
            purchase_date: expiry,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn sold_and_value_derivations() {
        let expiry = NaiveDate::from_ymd_opt(2027, 6, 1).unwrap();
        let b = batch("100", "60", "12.50", expiry);
        assert_eq!(b.sold_quantity(), Decimal::from(40));
        assert_eq!(b.total_purchase_amount(), Decimal::from_str("1250.00").unwrap());
    }

    #[test]
    fn expiry_window_excludes_already_expired() {
        let expiry = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let b = batch("10", "10", "1", expiry);

        let before = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(!b.is_expired(before));
        assert!(b.expires_within(before, 30));
        assert!(!b.expires_within(before, 7));

        let after = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert!(b.is_expired(after));
        assert!(!b.expires_within(after, 30));
    }
}
