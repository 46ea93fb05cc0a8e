//! HTTP handlers for vendors and the vendor ledger

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Vendor, VendorTransaction};
use crate::services::vendor::{
    ApplyPaymentInput, CreateVendorInput, PaymentReceipt, VendorService, VendorSummary,
};
use crate::AppState;

/// Create a vendor
pub async fn create_vendor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateVendorInput>,
) -> AppResult<Json<Vendor>> {
    let service = VendorService::new(state.db);
    let vendor = service
        .create_vendor(current_user.0.hospital_id, input)
        .await?;
    Ok(Json(vendor))
}

/// List vendors for the hospital
pub async fn list_vendors(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Vendor>>> {
    let service = VendorService::new(state.db);
    let vendors = service.list_vendors(current_user.0.hospital_id).await?;
    Ok(Json(vendors))
}

/// Get a vendor with its derived credit figures
pub async fn get_vendor_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<Json<VendorSummary>> {
    let service = VendorService::new(state.db);
    let summary = service
        .get_vendor_summary(current_user.0.hospital_id, vendor_id)
        .await?;
    Ok(Json(summary))
}

/// Outstanding transactions for a vendor, oldest due first
pub async fn list_outstanding_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<Json<Vec<VendorTransaction>>> {
    let service = VendorService::new(state.db);
    let transactions = service
        .list_outstanding(current_user.0.hospital_id, vendor_id)
        .await?;
    Ok(Json(transactions))
}

/// All transactions for a vendor
pub async fn list_vendor_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<Json<Vec<VendorTransaction>>> {
    let service = VendorService::new(state.db);
    let transactions = service
        .list_transactions(current_user.0.hospital_id, vendor_id)
        .await?;
    Ok(Json(transactions))
}

/// Apply a payment to a vendor's selected outstanding transactions
pub async fn apply_vendor_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(vendor_id): Path<Uuid>,
    Json(input): Json<ApplyPaymentInput>,
) -> AppResult<Json<PaymentReceipt>> {
    let service = VendorService::new(state.db);
    let receipt = service
        .apply_payment(current_user.0.hospital_id, vendor_id, input)
        .await?;
    Ok(Json(receipt))
}
