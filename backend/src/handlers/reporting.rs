//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{
    DashboardMetrics, ReportFilter, ReportingService, SalesSummaryPoint,
};
use crate::AppState;

/// Get dashboard metrics
pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db);
    let metrics = service
        .get_dashboard_metrics(
            current_user.0.hospital_id,
            state.config.alerts.expiry_window_days,
        )
        .await?;
    Ok(Json(metrics))
}

/// Get daily sales totals over a date range
pub async fn get_sales_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<SalesSummaryPoint>>> {
    let service = ReportingService::new(state.db);
    let summary = service
        .get_sales_summary(current_user.0.hospital_id, &filter)
        .await?;
    Ok(Json(summary))
}
