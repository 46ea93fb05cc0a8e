//! Database models for the Medicine Corner backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
