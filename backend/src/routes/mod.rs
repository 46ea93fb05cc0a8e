//! Route definitions for the Medicine Corner API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - medicine catalog
        .nest("/medicines", medicine_routes())
        // Protected routes - stock purchases and batches
        .nest("/stock", stock_routes())
        // Protected routes - vendors and the vendor ledger
        .nest("/vendors", vendor_routes())
        // Protected routes - sales
        .nest("/sales", sale_routes())
        // Protected routes - reporting
        .nest("/reports", reporting_routes())
}

/// Medicine catalog routes (protected)
fn medicine_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_medicines).post(handlers::create_medicine),
        )
        .route("/low-stock", get(handlers::list_low_stock_medicines))
        .route(
            "/:medicine_id",
            get(handlers::get_medicine).put(handlers::update_medicine),
        )
        .route(
            "/:medicine_id/batches",
            get(handlers::list_medicine_batches),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock purchase routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", post(handlers::record_purchase))
        .route(
            "/purchases/:batch_id",
            get(handlers::get_batch).put(handlers::update_purchase),
        )
        .route("/expiring", get(handlers::list_expiring_batches))
        .route("/expired", get(handlers::list_expired_batches))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Vendor routes (protected)
fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_vendors).post(handlers::create_vendor),
        )
        .route("/:vendor_id", get(handlers::get_vendor_summary))
        .route(
            "/:vendor_id/transactions",
            get(handlers::list_vendor_transactions),
        )
        .route(
            "/:vendor_id/outstanding",
            get(handlers::list_outstanding_transactions),
        )
        .route("/:vendor_id/payments", post(handlers::apply_vendor_payment))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale).put(handlers::update_sale),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard_metrics))
        .route("/sales-summary", get(handlers::get_sales_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}
