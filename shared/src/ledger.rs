//! Vendor balance ledger: payment allocation and credit utilization
//!
//! A payment is distributed across selected outstanding transactions in
//! ascending due-date order (oldest first), ties broken by transaction id
//! so the allocation is deterministic regardless of input order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::types::PaymentStatus;
use crate::validation::validate_quantity;

/// An outstanding vendor transaction eligible to absorb a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingDue {
    pub transaction_id: Uuid,
    pub due_date: NaiveDate,
    /// Original transaction amount
    pub amount: Decimal,
    /// Unpaid portion
    pub due_amount: Decimal,
}

/// Result of applying part of a payment to one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAllocation {
    pub transaction_id: Uuid,
    pub allocated: Decimal,
    pub due_after: Decimal,
    pub status_after: PaymentStatus,
}

/// Reject payments larger than the vendor's running balance. A vendor is
/// never paid into credit; the balance is the hard ceiling.
pub fn check_payment_within_balance(amount: Decimal, balance: Decimal) -> DomainResult<()> {
    if amount > balance {
        return Err(DomainError::PaymentExceedsBalance { amount, balance });
    }
    Ok(())
}

/// Distribute `amount` across the selected outstanding transactions.
///
/// Every selected transaction must carry a positive due. Any remainder left
/// after all selected dues are covered is rejected rather than silently
/// dropped, so the caller's balance arithmetic stays exact.
pub fn allocate_payment(
    amount: Decimal,
    outstanding: &[OutstandingDue],
) -> DomainResult<Vec<PaymentAllocation>> {
    validate_quantity("amount", amount)?;

    for txn in outstanding {
        if txn.due_amount <= Decimal::ZERO {
            return Err(DomainError::Validation {
                field: "transaction_ids".to_string(),
                message: format!("transaction {} has no outstanding due", txn.transaction_id),
            });
        }
    }

    let mut ordered: Vec<&OutstandingDue> = outstanding.iter().collect();
    ordered.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then(a.transaction_id.cmp(&b.transaction_id))
    });

    let mut remaining = amount;
    let mut allocations = Vec::with_capacity(ordered.len());
    for txn in ordered {
        if remaining.is_zero() {
            break;
        }
        let allocated = remaining.min(txn.due_amount);
        let due_after = txn.due_amount - allocated;
        let paid_after = txn.amount - due_after;
        allocations.push(PaymentAllocation {
            transaction_id: txn.transaction_id,
            allocated,
            due_after,
            status_after: PaymentStatus::derive(paid_after, due_after),
        });
        remaining -= allocated;
    }

    if remaining > Decimal::ZERO {
        return Err(DomainError::PaymentExceedsDue { remainder: remaining });
    }

    Ok(allocations)
}

/// Outstanding balance as a percentage of the credit limit.
/// Zero when no limit is set; never divides by zero.
pub fn credit_utilization(balance: Decimal, credit_limit: Decimal) -> Decimal {
    if credit_limit <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    balance / credit_limit * Decimal::from(100)
}
