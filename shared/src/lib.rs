//! Shared types and calculation engines for the Medicine Corner module
//!
//! This crate contains the pure business logic of the pharmacy inventory
//! and sales core: stock valuation, purchase and sale payment
//! reconciliation, and vendor payment allocation. It performs no I/O;
//! the backend wires these functions to persistence.

pub mod errors;
pub mod ledger;
pub mod models;
pub mod money;
pub mod payment;
pub mod types;
pub mod validation;
pub mod valuation;

pub use errors::*;
pub use models::*;
pub use types::*;
