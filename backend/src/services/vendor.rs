//! Vendor service: supplier records, due tracking, and payment allocation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Vendor, VendorTransaction, VendorTransactionType};
use shared::ledger::{allocate_payment, check_payment_within_balance, credit_utilization, OutstandingDue};
use shared::money::round_money;
use shared::types::PaymentStatus;
use shared::validation::validate_amount;

/// Vendor service for balance tracking and payment allocation
#[derive(Clone)]
pub struct VendorService {
    db: PgPool,
}

/// Row mapping for the vendors table
#[derive(Debug, FromRow)]
struct VendorRow {
    id: Uuid,
    hospital_id: Uuid,
    name: String,
    phone: Option<String>,
    current_balance: Decimal,
    credit_limit: Decimal,
    payment_terms_days: i32,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VendorRow> for Vendor {
    fn from(row: VendorRow) -> Self {
        Vendor {
            id: row.id,
            hospital_id: row.hospital_id,
            name: row.name,
            phone: row.phone,
            current_balance: row.current_balance,
            credit_limit: row.credit_limit,
            payment_terms_days: row.payment_terms_days,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row mapping for the vendor_transactions table
#[derive(Debug, FromRow)]
struct VendorTransactionRow {
    id: Uuid,
    hospital_id: Uuid,
    vendor_id: Uuid,
    stock_batch_id: Option<Uuid>,
    transaction_type: String,
    amount: Decimal,
    due_amount: Decimal,
    due_date: NaiveDate,
    payment_status: String,
    created_at: DateTime<Utc>,
}

impl VendorTransactionRow {
    fn into_model(self) -> AppResult<VendorTransaction> {
        let transaction_type = VendorTransactionType::from_str(&self.transaction_type)
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "unknown vendor transaction type '{}'",
                    self.transaction_type
                ))
            })?;
        let payment_status = PaymentStatus::from_str(&self.payment_status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "unknown payment status '{}'",
                self.payment_status
            ))
        })?;
        Ok(VendorTransaction {
            id: self.id,
            hospital_id: self.hospital_id,
            vendor_id: self.vendor_id,
            stock_batch_id: self.stock_batch_id,
            transaction_type,
            amount: self.amount,
            due_amount: self.due_amount,
            due_date: self.due_date,
            payment_status,
            created_at: self.created_at,
        })
    }
}

const VENDOR_COLUMNS: &str = "id, hospital_id, name, phone, current_balance, credit_limit, \
     payment_terms_days, version, created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "id, hospital_id, vendor_id, stock_batch_id, transaction_type, \
     amount, due_amount, due_date, payment_status, created_at";

/// Input for creating a vendor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendorInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub credit_limit: Decimal,
    pub payment_terms_days: Option<i32>,
}

/// Input for applying a payment against selected outstanding transactions
#[derive(Debug, Deserialize)]
pub struct ApplyPaymentInput {
    pub amount: Decimal,
    pub transaction_ids: Vec<Uuid>,
}

/// Vendor with derived credit figures
#[derive(Debug, Serialize)]
pub struct VendorSummary {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub credit_utilization_percent: Decimal,
    pub outstanding_transactions: i64,
}

/// Outcome of a vendor payment
#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub vendor_id: Uuid,
    pub amount_applied: Decimal,
    pub allocations: Vec<AllocationDetail>,
    pub balance_after: Decimal,
    pub credit_utilization_percent: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AllocationDetail {
    pub transaction_id: Uuid,
    pub allocated: Decimal,
    pub due_after: Decimal,
    pub payment_status: PaymentStatus,
}

impl VendorService {
    /// Create a new VendorService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a vendor
    pub async fn create_vendor(
        &self,
        hospital_id: Uuid,
        input: CreateVendorInput,
    ) -> AppResult<Vendor> {
        input.validate().map_err(|e| AppError::Validation {
            field: None,
            message: e.to_string(),
        })?;
        validate_amount("credit_limit", input.credit_limit)?;
        let payment_terms_days = input.payment_terms_days.unwrap_or(30);
        if payment_terms_days < 0 {
            return Err(AppError::Validation {
                field: Some("payment_terms_days".to_string()),
                message: "payment terms cannot be negative".to_string(),
            });
        }

        let row = sqlx::query_as::<_, VendorRow>(&format!(
            r#"
            INSERT INTO vendors (hospital_id, name, phone, credit_limit, payment_terms_days)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            VENDOR_COLUMNS
        ))
        .bind(hospital_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(input.credit_limit)
        .bind(payment_terms_days)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List vendors for a hospital
    pub async fn list_vendors(&self, hospital_id: Uuid) -> AppResult<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {} FROM vendors WHERE hospital_id = $1 ORDER BY name ASC",
            VENDOR_COLUMNS
        ))
        .bind(hospital_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Vendor::from).collect())
    }

    /// Get a vendor with derived credit figures
    pub async fn get_vendor_summary(
        &self,
        hospital_id: Uuid,
        vendor_id: Uuid,
    ) -> AppResult<VendorSummary> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {} FROM vendors WHERE id = $1 AND hospital_id = $2",
            VENDOR_COLUMNS
        ))
        .bind(vendor_id)
        .bind(hospital_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;

        let outstanding: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vendor_transactions WHERE vendor_id = $1 AND due_amount > 0",
        )
        .bind(vendor_id)
        .fetch_one(&self.db)
        .await?;

        let vendor: Vendor = row.into();
        let utilization = round_money(vendor.credit_utilization());

        Ok(VendorSummary {
            vendor,
            credit_utilization_percent: utilization,
            outstanding_transactions: outstanding,
        })
    }

    /// Outstanding transactions for a vendor, oldest due first
    pub async fn list_outstanding(
        &self,
        hospital_id: Uuid,
        vendor_id: Uuid,
    ) -> AppResult<Vec<VendorTransaction>> {
        let rows = sqlx::query_as::<_, VendorTransactionRow>(&format!(
            r#"
            SELECT {}
            FROM vendor_transactions
            WHERE hospital_id = $1 AND vendor_id = $2 AND due_amount > 0
            ORDER BY due_date ASC, id ASC
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(hospital_id)
        .bind(vendor_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(VendorTransactionRow::into_model)
            .collect()
    }

    /// All transactions for a vendor, newest first
    pub async fn list_transactions(
        &self,
        hospital_id: Uuid,
        vendor_id: Uuid,
    ) -> AppResult<Vec<VendorTransaction>> {
        let rows = sqlx::query_as::<_, VendorTransactionRow>(&format!(
            r#"
            SELECT {}
            FROM vendor_transactions
            WHERE hospital_id = $1 AND vendor_id = $2
            ORDER BY created_at DESC
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(hospital_id)
        .bind(vendor_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(VendorTransactionRow::into_model)
            .collect()
    }

    /// Apply a payment against selected outstanding transactions.
    ///
    /// The amount is distributed oldest due first. A payment larger than the
    /// vendor's running balance, or larger than the selected dues, is
    /// rejected. The vendor balance drops by exactly the amount applied.
    pub async fn apply_payment(
        &self,
        hospital_id: Uuid,
        vendor_id: Uuid,
        input: ApplyPaymentInput,
    ) -> AppResult<PaymentReceipt> {
        if input.transaction_ids.is_empty() {
            return Err(AppError::Validation {
                field: Some("transaction_ids".to_string()),
                message: "at least one transaction must be selected".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let vendor = sqlx::query_as::<_, (Decimal, Decimal, i64)>(
            "SELECT current_balance, credit_limit, version FROM vendors \
             WHERE id = $1 AND hospital_id = $2",
        )
        .bind(vendor_id)
        .bind(hospital_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;
        let (current_balance, credit_limit, vendor_version) = vendor;

        check_payment_within_balance(input.amount, current_balance)?;

        let selected = sqlx::query_as::<_, (Uuid, NaiveDate, Decimal, Decimal)>(
            r#"
            SELECT id, due_date, amount, due_amount
            FROM vendor_transactions
            WHERE vendor_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(vendor_id)
        .bind(&input.transaction_ids)
        .fetch_all(&mut *tx)
        .await?;

        if selected.len() != input.transaction_ids.len() {
            return Err(AppError::NotFound("Vendor transaction".to_string()));
        }

        let outstanding: Vec<OutstandingDue> = selected
            .into_iter()
            .map(|(id, due_date, amount, due_amount)| OutstandingDue {
                transaction_id: id,
                due_date,
                amount,
                due_amount,
            })
            .collect();

        let allocations = allocate_payment(input.amount, &outstanding)?;

        for alloc in &allocations {
            sqlx::query(
                "UPDATE vendor_transactions SET due_amount = $1, payment_status = $2 WHERE id = $3",
            )
            .bind(alloc.due_after)
            .bind(alloc.status_after.as_str())
            .bind(alloc.transaction_id)
            .execute(&mut *tx)
            .await?;
        }

        // Record the payment itself on the ledger
        sqlx::query(
            r#"
            INSERT INTO vendor_transactions (
                hospital_id, vendor_id, transaction_type, amount, due_amount,
                due_date, payment_status
            )
            VALUES ($1, $2, 'payment', $3, 0, $4, 'paid')
            "#,
        )
        .bind(hospital_id)
        .bind(vendor_id)
        .bind(input.amount)
        .bind(Utc::now().date_naive())
        .execute(&mut *tx)
        .await?;

        let balance_after = current_balance - input.amount;
        let result = sqlx::query(
            r#"
            UPDATE vendors
            SET current_balance = $1, version = version + 1, updated_at = NOW()
            WHERE id = $2 AND version = $3
            "#,
        )
        .bind(balance_after)
        .bind(vendor_id)
        .bind(vendor_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "vendor balance was modified concurrently".to_string(),
            ));
        }

        tx.commit().await?;

        tracing::info!(
            vendor_id = %vendor_id,
            amount = %input.amount,
            transactions = allocations.len(),
            "applied vendor payment"
        );

        Ok(PaymentReceipt {
            vendor_id,
            amount_applied: input.amount,
            allocations: allocations
                .into_iter()
                .map(|a| AllocationDetail {
                    transaction_id: a.transaction_id,
                    allocated: a.allocated,
                    due_after: a.due_after,
                    payment_status: a.status_after,
                })
                .collect(),
            balance_after,
            credit_utilization_percent: round_money(credit_utilization(balance_after, credit_limit)),
        })
    }
}
