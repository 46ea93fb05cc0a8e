//! Validation guards for user-entered pharmacy values

use rust_decimal::Decimal;

use crate::errors::{DomainError, DomainResult};

/// Quantities must be strictly positive
pub fn validate_quantity(field: &'static str, quantity: Decimal) -> DomainResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(DomainError::ZeroQuantity { field });
    }
    Ok(())
}

/// Monetary amounts may be zero but never negative
pub fn validate_amount(field: &'static str, amount: Decimal) -> DomainResult<()> {
    if amount < Decimal::ZERO {
        return Err(DomainError::NegativeAmount { field });
    }
    Ok(())
}

/// Names and batch numbers must be non-empty after trimming
pub fn validate_name(field: &'static str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation {
            field: field.to_string(),
            message: format!("{} cannot be empty", field),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity("quantity", Decimal::from(1)).is_ok());
        assert_eq!(
            validate_quantity("quantity", Decimal::ZERO),
            Err(DomainError::ZeroQuantity { field: "quantity" })
        );
        assert!(validate_quantity("quantity", Decimal::from(-3)).is_err());
    }

    #[test]
    fn amount_may_be_zero() {
        assert!(validate_amount("paid_amount", Decimal::ZERO).is_ok());
        assert_eq!(
            validate_amount("paid_amount", Decimal::from(-1)),
            Err(DomainError::NegativeAmount {
                field: "paid_amount"
            })
        );
    }

    #[test]
    fn name_must_not_be_blank() {
        assert!(validate_name("name", "Paracetamol").is_ok());
        assert!(validate_name("name", "   ").is_err());
    }
}
