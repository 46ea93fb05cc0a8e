//! Domain models for the Medicine Corner module

mod medicine;
mod sale;
mod stock;
mod vendor;

pub use medicine::*;
pub use sale::*;
pub use stock::*;
pub use vendor::*;
