//! Money and quantity helpers
//!
//! Amounts are `rust_decimal::Decimal` end to end. Rounding is applied for
//! display only; stored values keep full precision.

use rust_decimal::Decimal;

use crate::errors::{DomainError, DomainResult};

/// Parse a user-entered currency or quantity value, rejecting negatives
pub fn parse_amount(field: &'static str, raw: &str) -> DomainResult<Decimal> {
    let value = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|_| DomainError::Validation {
            field: field.to_string(),
            message: format!("'{}' is not a valid amount", raw),
        })?;
    if value < Decimal::ZERO {
        return Err(DomainError::NegativeAmount { field });
    }
    Ok(value)
}

/// Round a currency value to 2 decimal places for display
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Round a quantity to 3 decimal places for display
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp(3)
}

/// Subtraction floored at zero
pub fn sub_or_zero(a: Decimal, b: Decimal) -> Decimal {
    if b >= a {
        Decimal::ZERO
    } else {
        a - b
    }
}

/// Clamp a value into `[lo, hi]`
pub fn clamp(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    value.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parses_valid_amounts() {
        assert_eq!(parse_amount("price", " 12.50 ").unwrap(), dec("12.50"));
        assert_eq!(parse_amount("price", "0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert!(matches!(
            parse_amount("price", "12,50"),
            Err(DomainError::Validation { .. })
        ));
        assert_eq!(
            parse_amount("price", "-1"),
            Err(DomainError::NegativeAmount { field: "price" })
        );
    }

    #[test]
    fn sub_or_zero_never_goes_negative() {
        assert_eq!(sub_or_zero(dec("10"), dec("4")), dec("6"));
        assert_eq!(sub_or_zero(dec("4"), dec("10")), Decimal::ZERO);
        assert_eq!(sub_or_zero(dec("4"), dec("4")), Decimal::ZERO);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(dec("5"), Decimal::ZERO, dec("3")), dec("3"));
        assert_eq!(clamp(dec("-2"), Decimal::ZERO, dec("3")), Decimal::ZERO);
        assert_eq!(clamp(dec("2"), Decimal::ZERO, dec("3")), dec("2"));
    }

    #[test]
    fn display_rounding() {
        assert_eq!(round_money(dec("10.666666")), dec("10.67"));
        assert_eq!(round_quantity(dec("1.23456")), dec("1.235"));
    }
}
