//! HTTP handlers

pub mod health;
pub mod medicine;
pub mod reporting;
pub mod sale;
pub mod stock;
pub mod vendor;

pub use health::*;
pub use medicine::*;
pub use reporting::*;
pub use sale::*;
pub use stock::*;
pub use vendor::*;
