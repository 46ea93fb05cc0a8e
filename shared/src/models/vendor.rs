//! Vendor and vendor transaction models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PaymentStatus;

/// A medicine supplier with a running due balance and credit terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    /// Sum of unpaid dues across this vendor's transactions; never negative
    pub current_balance: Decimal,
    pub credit_limit: Decimal,
    /// Days after a purchase before its due date
    pub payment_terms_days: i32,
    /// Optimistic concurrency token
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// Outstanding balance as a percentage of the credit limit
    pub fn credit_utilization(&self) -> Decimal {
        crate::ledger::credit_utilization(self.current_balance, self.credit_limit)
    }
}

/// Kind of due-bearing event on a vendor's ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorTransactionType {
    Purchase,
    Payment,
}

impl VendorTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorTransactionType::Purchase => "purchase",
            VendorTransactionType::Payment => "payment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(VendorTransactionType::Purchase),
            "payment" => Some(VendorTransactionType::Payment),
            _ => None,
        }
    }
}

/// A due-bearing event tied to a vendor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorTransaction {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub vendor_id: Uuid,
    /// Purchase transactions reference the batch they bought
    pub stock_batch_id: Option<Uuid>,
    pub transaction_type: VendorTransactionType,
    pub amount: Decimal,
    pub due_amount: Decimal,
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}
