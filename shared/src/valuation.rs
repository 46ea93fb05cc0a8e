//! Stock valuation: weighted-average cost and unit-price derivation
//!
//! `Medicine.average_buy_price` is a quantity-weighted average over all
//! costed stock, recomputed on every purchase. Purchases are entered as a
//! total price for a quantity, so the per-unit cost is derived here.

use rust_decimal::Decimal;

use crate::errors::DomainResult;
use crate::validation::{validate_amount, validate_quantity};

/// Derive a unit price from a total purchase price
pub fn unit_price(total_price: Decimal, quantity: Decimal) -> DomainResult<Decimal> {
    validate_amount("total_price", total_price)?;
    validate_quantity("quantity", quantity)?;
    Ok(total_price / quantity)
}

/// Weighted-average cost after adding `incoming_qty` units bought at
/// `incoming_unit_price` to `old_stock` units carried at `old_avg`.
///
/// With no prior stock the result is exactly the incoming unit price. The
/// result always lies within `[min(old_avg, price), max(old_avg, price)]`.
pub fn weighted_average_cost(
    old_stock: Decimal,
    old_avg: Decimal,
    incoming_qty: Decimal,
    incoming_unit_price: Decimal,
) -> DomainResult<Decimal> {
    validate_amount("total_stock", old_stock)?;
    validate_amount("average_buy_price", old_avg)?;
    validate_quantity("quantity", incoming_qty)?;
    validate_amount("unit_price", incoming_unit_price)?;

    if old_stock.is_zero() {
        return Ok(incoming_unit_price);
    }

    Ok((old_stock * old_avg + incoming_qty * incoming_unit_price)
        / (old_stock + incoming_qty))
}

/// Value of stock on hand at a blended unit cost
pub fn stock_value(quantity: Decimal, unit_cost: Decimal) -> Decimal {
    quantity * unit_cost
}
