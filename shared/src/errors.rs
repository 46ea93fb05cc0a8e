//! Typed failures for the pharmacy domain calculations
//!
//! Every business-rule violation carries the offending field or values so
//! the controller layer can render a precise message. None of these are
//! transient; no retries apply.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain error for the pure calculation engines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{field} must be greater than zero")]
    ZeroQuantity { field: &'static str },

    #[error("{field} cannot be negative")]
    NegativeAmount { field: &'static str },

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    #[error("insufficient_available_quantity: new quantity {requested} is below the {sold} units already sold")]
    InsufficientAvailableQuantity { requested: Decimal, sold: Decimal },

    #[error("payment {amount} exceeds vendor balance {balance}")]
    PaymentExceedsBalance { amount: Decimal, balance: Decimal },

    #[error("payment leaves {remainder} unallocated after covering the selected dues")]
    PaymentExceedsDue { remainder: Decimal },

    #[error("a sale requires at least one item")]
    EmptySale,
}

impl DomainError {
    /// Field name to surface to the caller, when one applies
    pub fn field(&self) -> Option<&str> {
        match self {
            DomainError::Validation { field, .. } => Some(field),
            DomainError::ZeroQuantity { field } | DomainError::NegativeAmount { field } => {
                Some(field)
            }
            _ => None,
        }
    }
}

/// Result type alias for the calculation engines
pub type DomainResult<T> = Result<T, DomainError>;
