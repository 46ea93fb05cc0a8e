//! HTTP handlers for stock purchases and batch queries

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::StockBatch;
use crate::services::stock::{RecordPurchaseInput, StockService, UpdatePurchaseInput};
use crate::AppState;

/// Query parameters for the expiring-batch report
#[derive(Debug, Deserialize)]
pub struct ExpiryQuery {
    /// Overrides the configured alert window
    pub within_days: Option<i64>,
}

/// Record a stock purchase
pub async fn record_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordPurchaseInput>,
) -> AppResult<Json<StockBatch>> {
    let service = StockService::new(state.db);
    let batch = service
        .record_purchase(current_user.0.hospital_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(batch))
}

/// Edit a stock purchase
pub async fn update_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseInput>,
) -> AppResult<Json<StockBatch>> {
    let service = StockService::new(state.db);
    let batch = service
        .update_purchase(current_user.0.hospital_id, batch_id, input)
        .await?;
    Ok(Json(batch))
}

/// Get a single batch
pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<StockBatch>> {
    let service = StockService::new(state.db);
    let batch = service
        .get_batch(current_user.0.hospital_id, batch_id)
        .await?;
    Ok(Json(batch))
}

/// List batches of a medicine
pub async fn list_medicine_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(medicine_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockBatch>>> {
    let service = StockService::new(state.db);
    let batches = service
        .list_batches(current_user.0.hospital_id, medicine_id)
        .await?;
    Ok(Json(batches))
}

/// Batches with remaining stock that expire inside the alert window
pub async fn list_expiring_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ExpiryQuery>,
) -> AppResult<Json<Vec<StockBatch>>> {
    let within_days = query
        .within_days
        .unwrap_or(state.config.alerts.expiry_window_days);
    let service = StockService::new(state.db);
    let batches = service
        .expiring_batches(current_user.0.hospital_id, within_days)
        .await?;
    Ok(Json(batches))
}

/// Batches past expiry that still show remaining stock
pub async fn list_expired_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockBatch>>> {
    let service = StockService::new(state.db);
    let batches = service.expired_batches(current_user.0.hospital_id).await?;
    Ok(Json(batches))
}
