//! HTTP handlers for sales

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Sale;
use crate::services::sale::{CreateSaleInput, SaleService, SaleWithItems};
use crate::AppState;

/// Query parameters for listing sales
#[derive(Debug, Deserialize)]
pub struct SaleListQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Create a sale
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<SaleWithItems>> {
    let service = SaleService::new(state.db);
    let sale = service.create_sale(current_user.0.hospital_id, input).await?;
    Ok(Json(sale))
}

/// Edit a sale
pub async fn update_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<SaleWithItems>> {
    let service = SaleService::new(state.db);
    let sale = service
        .update_sale(current_user.0.hospital_id, sale_id, input)
        .await?;
    Ok(Json(sale))
}

/// Get a sale with its items
pub async fn get_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleWithItems>> {
    let service = SaleService::new(state.db);
    let sale = service.get_sale(current_user.0.hospital_id, sale_id).await?;
    Ok(Json(sale))
}

/// List sales, optionally within a date range
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SaleListQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db);
    let sales = service
        .list_sales(current_user.0.hospital_id, query.start_date, query.end_date)
        .await?;
    Ok(Json(sales))
}
