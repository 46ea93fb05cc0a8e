//! Business logic services for the Medicine Corner module

pub mod medicine;
pub mod reporting;
pub mod sale;
pub mod stock;
pub mod vendor;

pub use medicine::MedicineService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use stock::StockService;
pub use vendor::VendorService;
