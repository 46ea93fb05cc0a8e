//! Purchase and sale payment reconciliation
//!
//! Keeps the paid/due/status triple of a transaction mutually consistent.
//! Paid inputs are clamped into `[0, total]` so `paid + due == total` holds
//! unconditionally after reconciliation.

use rust_decimal::Decimal;

use crate::errors::{DomainError, DomainResult};
use crate::money::clamp;
use crate::types::{DiscountType, PaymentStatus};
use crate::validation::{validate_amount, validate_quantity};
use crate::valuation;

/// How a total splits into paid and due portions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSplit {
    pub total: Decimal,
    pub paid: Decimal,
    pub due: Decimal,
    pub status: PaymentStatus,
}

/// Split a total into paid and due portions and derive the status
pub fn split_payment(total: Decimal, paid_input: Decimal) -> DomainResult<PaymentSplit> {
    validate_amount("total_amount", total)?;
    let paid = clamp(paid_input, Decimal::ZERO, total);
    let due = total - paid;
    Ok(PaymentSplit {
        total,
        paid,
        due,
        status: PaymentStatus::derive(paid, due),
    })
}

/// Financial fields of a stock purchase derived from user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseReconciliation {
    pub unit_price: Decimal,
    pub split: PaymentSplit,
}

/// Derive unit price and the paid/due split for a stock purchase
pub fn reconcile_purchase(
    quantity: Decimal,
    total_price: Decimal,
    paid_input: Decimal,
) -> DomainResult<PurchaseReconciliation> {
    let unit_price = valuation::unit_price(total_price, quantity)?;
    let split = split_payment(total_price, paid_input)?;
    Ok(PurchaseReconciliation { unit_price, split })
}

/// Reject purchase edits that would cut the quantity below what has
/// already been sold out of the batch.
pub fn check_edit_quantity(
    new_quantity: Decimal,
    original_quantity: Decimal,
    available_quantity: Decimal,
) -> DomainResult<()> {
    validate_quantity("quantity", new_quantity)?;
    let sold = original_quantity - available_quantity;
    if new_quantity < sold {
        return Err(DomainError::InsufficientAvailableQuantity {
            requested: new_quantity,
            sold,
        });
    }
    Ok(())
}

/// Re-derive a purchase's ledger due after the purchase is edited.
///
/// Vendor payments already allocated against the ledger transaction stay
/// settled: the new due is the edited due minus whatever earlier payments
/// covered, floored at zero. With no payments applied
/// (`previous_outstanding == previous_due`) this reduces to the edited due.
pub fn rebase_ledger_due(
    new_total: Decimal,
    new_due: Decimal,
    previous_due: Decimal,
    previous_outstanding: Decimal,
) -> (Decimal, PaymentStatus) {
    let settled = (previous_due - previous_outstanding).max(Decimal::ZERO);
    let due_after = (new_due - settled).max(Decimal::ZERO);
    let status = PaymentStatus::derive(new_total - due_after, due_after);
    (due_after, status)
}

/// A sale line item snapshot used for totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Batch cost at sale time
    pub buy_price: Decimal,
    /// Units remaining in the referenced batch
    pub available_quantity: Decimal,
}

/// Financial summary of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub paid: Decimal,
    pub due: Decimal,
    pub profit: Decimal,
    pub status: PaymentStatus,
}

/// Derive a sale's financial summary from its line items and payment input
pub fn finalize_sale(
    items: &[SaleLine],
    discount_input: Decimal,
    discount_type: DiscountType,
    tax: Decimal,
    paid_input: Decimal,
) -> DomainResult<SaleTotals> {
    if items.is_empty() {
        return Err(DomainError::EmptySale);
    }
    validate_amount("discount", discount_input)?;
    validate_amount("tax", tax)?;

    let mut subtotal = Decimal::ZERO;
    let mut profit = Decimal::ZERO;
    for item in items {
        validate_quantity("quantity", item.quantity)?;
        validate_amount("unit_price", item.unit_price)?;
        if item.quantity > item.available_quantity {
            return Err(DomainError::InsufficientStock {
                requested: item.quantity,
                available: item.available_quantity,
            });
        }
        subtotal += item.quantity * item.unit_price;
        profit += (item.unit_price - item.buy_price) * item.quantity;
    }

    let discount = match discount_type {
        DiscountType::Percentage => subtotal * discount_input / Decimal::from(100),
        DiscountType::Amount => discount_input,
    };
    let discount = clamp(discount, Decimal::ZERO, subtotal);
    let total = (subtotal - discount + tax).max(Decimal::ZERO);
    let split = split_payment(total, paid_input)?;

    Ok(SaleTotals {
        subtotal,
        discount,
        tax,
        total,
        paid: split.paid,
        due: split.due,
        profit,
        status: split.status,
    })
}
