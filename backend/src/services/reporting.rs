//! Reporting service for dashboard metrics and sales summaries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::types::DateRange;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_medicines: i64,
    pub low_stock_count: i64,
    pub expiring_batch_count: i64,
    pub sales_today_total: Decimal,
    pub sales_today_profit: Decimal,
    pub outstanding_vendor_dues: Decimal,
    pub pending_purchase_count: i64,
}

/// Daily sales summary point
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SalesSummaryPoint {
    pub sale_date: NaiveDate,
    pub sale_count: i64,
    pub total_amount: Decimal,
    pub total_profit: Decimal,
    pub total_due: Decimal,
}

/// Report filter parameters
#[derive(Debug, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get dashboard metrics
    pub async fn get_dashboard_metrics(
        &self,
        hospital_id: Uuid,
        expiry_window_days: i64,
    ) -> AppResult<DashboardMetrics> {
        // Catalog size and low-stock count
        let medicine_counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE total_stock <= reorder_level) as low_stock
            FROM medicines WHERE hospital_id = $1
            "#,
        )
        .bind(hospital_id)
        .fetch_one(&self.db)
        .await?;

        // Batches that still hold stock and expire inside the alert window
        let expiring_batch_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_batches
            WHERE hospital_id = $1
              AND available_quantity > 0
              AND expiry_date >= CURRENT_DATE
              AND expiry_date <= CURRENT_DATE + ($2 * INTERVAL '1 day')
            "#,
        )
        .bind(hospital_id)
        .bind(expiry_window_days)
        .fetch_one(&self.db)
        .await?;

        // Today's sales
        let sales_today: (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total_amount), 0) as total,
                COALESCE(SUM(total_profit), 0) as profit
            FROM sales
            WHERE hospital_id = $1 AND sale_date = CURRENT_DATE
            "#,
        )
        .bind(hospital_id)
        .fetch_one(&self.db)
        .await?;

        // Vendor dues across all transactions
        let outstanding_vendor_dues: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(due_amount), 0)
            FROM vendor_transactions
            WHERE hospital_id = $1 AND due_amount > 0
            "#,
        )
        .bind(hospital_id)
        .fetch_one(&self.db)
        .await?;

        // Purchases not yet settled
        let pending_purchase_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_batches
            WHERE hospital_id = $1 AND payment_status != 'paid'
            "#,
        )
        .bind(hospital_id)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            total_medicines: medicine_counts.0,
            low_stock_count: medicine_counts.1,
            expiring_batch_count,
            sales_today_total: sales_today.0,
            sales_today_profit: sales_today.1,
            outstanding_vendor_dues,
            pending_purchase_count,
        })
    }

    /// Get daily sales totals over a date range
    pub async fn get_sales_summary(
        &self,
        hospital_id: Uuid,
        filter: &ReportFilter,
    ) -> AppResult<Vec<SalesSummaryPoint>> {
        let range = DateRange {
            start: filter
                .start_date
                .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
            end: filter
                .end_date
                .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap()),
        };

        let points = sqlx::query_as::<_, SalesSummaryPoint>(
            r#"
            SELECT
                sale_date,
                COUNT(*) as sale_count,
                COALESCE(SUM(total_amount), 0) as total_amount,
                COALESCE(SUM(total_profit), 0) as total_profit,
                COALESCE(SUM(due_amount), 0) as total_due
            FROM sales
            WHERE hospital_id = $1
              AND sale_date BETWEEN $2 AND $3
            GROUP BY sale_date
            ORDER BY sale_date ASC
            "#,
        )
        .bind(hospital_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(points)
    }
}
