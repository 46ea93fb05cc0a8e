//! Sales transaction models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{PaymentMethod, PaymentStatus};

/// A counter sale with its derived financial summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub invoice_number: String,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    /// `max(0, subtotal - discount + tax)`
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub total_profit: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of a sale, referencing the batch it was drawn from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub stock_batch_id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Snapshot of the batch cost at sale time
    pub buy_price: Decimal,
}

impl SaleItem {
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    pub fn line_profit(&self) -> Decimal {
        (self.unit_price - self.buy_price) * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn line_derivations() {
        let item = SaleItem {
            id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            stock_batch_id: Uuid::new_v4(),
            medicine_id: Uuid::new_v4(),
            quantity: Decimal::from(8),
            unit_price: Decimal::from_str("50").unwrap(),
            buy_price: Decimal::from_str("35").unwrap(),
        };
        assert_eq!(item.line_total(), Decimal::from(400));
        assert_eq!(item.line_profit(), Decimal::from(120));
    }
}
