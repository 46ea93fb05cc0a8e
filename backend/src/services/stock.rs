//! Stock purchase service
//!
//! Records and edits stock batches. Each operation runs in a single
//! transaction: batch fields, the vendor's purchase transaction and running
//! balance, and the medicine's weighted-average cost are written together.
//! Medicine and vendor rows carry a version column; a zero-row update means
//! a concurrent writer won and the operation fails with a conflict.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::StockBatch;
use shared::payment::{check_edit_quantity, rebase_ledger_due, reconcile_purchase};
use shared::types::{PaymentMethod, PaymentStatus};
use shared::validation::validate_name;
use shared::valuation;

/// Stock service for purchase transactions and expiry queries
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Row mapping for the stock_batches table
#[derive(Debug, FromRow)]
struct StockBatchRow {
    id: Uuid,
    hospital_id: Uuid,
    medicine_id: Uuid,
    vendor_id: Uuid,
    batch_number: String,
    expiry_date: NaiveDate,
    quantity: Decimal,
    available_quantity: Decimal,
    buy_price: Decimal,
    sale_price: Decimal,
    paid_amount: Decimal,
    due_amount: Decimal,
    payment_status: String,
    payment_method: String,
    purchase_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const BATCH_COLUMNS: &str = "id, hospital_id, medicine_id, vendor_id, batch_number, expiry_date, \
     quantity, available_quantity, buy_price, sale_price, paid_amount, due_amount, \
     payment_status, payment_method, purchase_date, created_at, updated_at";

fn parse_status(s: &str) -> AppResult<PaymentStatus> {
    PaymentStatus::from_str(s)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown payment status '{}'", s)))
}

fn parse_method(s: &str) -> AppResult<PaymentMethod> {
    PaymentMethod::from_str(s)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown payment method '{}'", s)))
}

impl StockBatchRow {
    fn into_model(self) -> AppResult<StockBatch> {
        Ok(StockBatch {
            payment_status: parse_status(&self.payment_status)?,
            payment_method: parse_method(&self.payment_method)?,
            id: self.id,
            hospital_id: self.hospital_id,
            medicine_id: self.medicine_id,
            vendor_id: self.vendor_id,
            batch_number: self.batch_number,
            expiry_date: self.expiry_date,
            quantity: self.quantity,
            available_quantity: self.available_quantity,
            buy_price: self.buy_price,
            sale_price: self.sale_price,
            paid_amount: self.paid_amount,
            due_amount: self.due_amount,
            purchase_date: self.purchase_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Input for recording a stock purchase.
/// Prices are entered as a total for the quantity, not per unit.
#[derive(Debug, Deserialize)]
pub struct RecordPurchaseInput {
    pub medicine_id: Uuid,
    pub vendor_id: Uuid,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: Decimal,
    pub total_price: Decimal,
    pub paid_amount: Decimal,
    pub sale_price: Decimal,
    pub payment_method: PaymentMethod,
    pub purchase_date: Option<NaiveDate>,
}

/// Input for editing an existing stock purchase
#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseInput {
    pub quantity: Decimal,
    pub total_price: Decimal,
    pub paid_amount: Decimal,
    pub sale_price: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a stock purchase: create the batch, post the vendor due, and
    /// fold the new units into the medicine's weighted-average cost.
    pub async fn record_purchase(
        &self,
        hospital_id: Uuid,
        user_id: Uuid,
        input: RecordPurchaseInput,
    ) -> AppResult<StockBatch> {
        validate_name("batch_number", &input.batch_number)?;
        let rec = reconcile_purchase(input.quantity, input.total_price, input.paid_amount)?;

        let mut tx = self.db.begin().await?;

        // Load the medicine's running totals
        let medicine = sqlx::query_as::<_, (Decimal, Decimal, i64)>(
            "SELECT total_stock, average_buy_price, version FROM medicines \
             WHERE id = $1 AND hospital_id = $2",
        )
        .bind(input.medicine_id)
        .bind(hospital_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Medicine".to_string()))?;
        let (total_stock, average_buy_price, medicine_version) = medicine;

        let vendor = sqlx::query_as::<_, (Decimal, i32, i64)>(
            "SELECT current_balance, payment_terms_days, version FROM vendors \
             WHERE id = $1 AND hospital_id = $2",
        )
        .bind(input.vendor_id)
        .bind(hospital_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;
        let (current_balance, payment_terms_days, vendor_version) = vendor;

        let new_avg = valuation::weighted_average_cost(
            total_stock,
            average_buy_price,
            input.quantity,
            rec.unit_price,
        )?;

        let purchase_date = input
            .purchase_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let due_date = purchase_date + Duration::days(payment_terms_days as i64);

        let row = sqlx::query_as::<_, StockBatchRow>(&format!(
            r#"
            INSERT INTO stock_batches (
                hospital_id, medicine_id, vendor_id, batch_number, expiry_date,
                quantity, available_quantity, buy_price, sale_price,
                paid_amount, due_amount, payment_status, payment_method,
                purchase_date, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(hospital_id)
        .bind(input.medicine_id)
        .bind(input.vendor_id)
        .bind(&input.batch_number)
        .bind(input.expiry_date)
        .bind(input.quantity)
        .bind(rec.unit_price)
        .bind(input.sale_price)
        .bind(rec.split.paid)
        .bind(rec.split.due)
        .bind(rec.split.status.as_str())
        .bind(input.payment_method.as_str())
        .bind(purchase_date)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO vendor_transactions (
                hospital_id, vendor_id, stock_batch_id, transaction_type,
                amount, due_amount, due_date, payment_status
            )
            VALUES ($1, $2, $3, 'purchase', $4, $5, $6, $7)
            "#,
        )
        .bind(hospital_id)
        .bind(input.vendor_id)
        .bind(row.id)
        .bind(rec.split.total)
        .bind(rec.split.due)
        .bind(due_date)
        .bind(rec.split.status.as_str())
        .execute(&mut *tx)
        .await?;

        self.update_medicine_totals(
            &mut tx,
            input.medicine_id,
            new_avg,
            total_stock + input.quantity,
            medicine_version,
        )
        .await?;
        self.update_vendor_balance(
            &mut tx,
            input.vendor_id,
            current_balance + rec.split.due,
            vendor_version,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            batch_id = %row.id,
            medicine_id = %input.medicine_id,
            vendor_id = %input.vendor_id,
            "recorded stock purchase"
        );

        row.into_model()
    }

    /// Edit a stock purchase, re-deriving its financial fields.
    /// The new quantity must not drop below the units already sold.
    pub async fn update_purchase(
        &self,
        hospital_id: Uuid,
        batch_id: Uuid,
        input: UpdatePurchaseInput,
    ) -> AppResult<StockBatch> {
        let mut tx = self.db.begin().await?;

        let batch = sqlx::query_as::<_, StockBatchRow>(&format!(
            "SELECT {} FROM stock_batches WHERE id = $1 AND hospital_id = $2",
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(hospital_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))?;

        check_edit_quantity(input.quantity, batch.quantity, batch.available_quantity)?;
        let rec = reconcile_purchase(input.quantity, input.total_price, input.paid_amount)?;

        let sold = batch.quantity - batch.available_quantity;
        let new_available = input.quantity - sold;

        let medicine = sqlx::query_as::<_, (Decimal, Decimal, i64)>(
            "SELECT total_stock, average_buy_price, version FROM medicines WHERE id = $1",
        )
        .bind(batch.medicine_id)
        .fetch_one(&mut *tx)
        .await?;
        let (total_stock, average_buy_price, medicine_version) = medicine;

        // Swap this batch's remaining units from the old cost to the new one
        // and re-derive the blended average over what is on hand.
        let stock_without = total_stock - batch.available_quantity;
        let value_without = valuation::stock_value(total_stock, average_buy_price)
            - valuation::stock_value(batch.available_quantity, batch.buy_price);
        let new_total_stock = stock_without + new_available;
        let new_avg = if new_total_stock.is_zero() {
            rec.unit_price
        } else {
            (value_without.max(Decimal::ZERO) + new_available * rec.unit_price) / new_total_stock
        };

        let vendor = sqlx::query_as::<_, (Decimal, i64)>(
            "SELECT current_balance, version FROM vendors WHERE id = $1",
        )
        .bind(batch.vendor_id)
        .fetch_one(&mut *tx)
        .await?;
        let (current_balance, vendor_version) = vendor;

        // The ledger row may already have absorbed vendor payments; those
        // stay settled, so the new ledger due and the balance delta are
        // derived from the ledger row, not the batch's own due.
        let old_txn_due: Decimal = sqlx::query_scalar(
            "SELECT due_amount FROM vendor_transactions \
             WHERE stock_batch_id = $1 AND transaction_type = 'purchase'",
        )
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?;
        let (txn_due_after, txn_status) = rebase_ledger_due(
            rec.split.total,
            rec.split.due,
            batch.due_amount,
            old_txn_due,
        );
        let due_delta = txn_due_after - old_txn_due;
        let balance_after = (current_balance + due_delta).max(Decimal::ZERO);

        let sale_price = input.sale_price.unwrap_or(batch.sale_price);
        let expiry_date = input.expiry_date.unwrap_or(batch.expiry_date);
        let payment_method = match input.payment_method {
            Some(m) => m,
            None => parse_method(&batch.payment_method)?,
        };

        let updated = sqlx::query_as::<_, StockBatchRow>(&format!(
            r#"
            UPDATE stock_batches
            SET quantity = $1, available_quantity = $2, buy_price = $3, sale_price = $4,
                expiry_date = $5, paid_amount = $6, due_amount = $7, payment_status = $8,
                payment_method = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(input.quantity)
        .bind(new_available)
        .bind(rec.unit_price)
        .bind(sale_price)
        .bind(expiry_date)
        .bind(rec.split.paid)
        .bind(rec.split.due)
        .bind(rec.split.status.as_str())
        .bind(payment_method.as_str())
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE vendor_transactions
            SET amount = $1, due_amount = $2, payment_status = $3
            WHERE stock_batch_id = $4 AND transaction_type = 'purchase'
            "#,
        )
        .bind(rec.split.total)
        .bind(txn_due_after)
        .bind(txn_status.as_str())
        .bind(batch_id)
        .execute(&mut *tx)
        .await?;

        self.update_medicine_totals(
            &mut tx,
            batch.medicine_id,
            new_avg,
            new_total_stock,
            medicine_version,
        )
        .await?;
        self.update_vendor_balance(&mut tx, batch.vendor_id, balance_after, vendor_version)
            .await?;

        tx.commit().await?;

        tracing::info!(batch_id = %batch_id, "updated stock purchase");

        updated.into_model()
    }

    /// Get a single batch
    pub async fn get_batch(&self, hospital_id: Uuid, batch_id: Uuid) -> AppResult<StockBatch> {
        let row = sqlx::query_as::<_, StockBatchRow>(&format!(
            "SELECT {} FROM stock_batches WHERE id = $1 AND hospital_id = $2",
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(hospital_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))?;

        row.into_model()
    }

    /// List batches of a medicine, newest purchase first
    pub async fn list_batches(
        &self,
        hospital_id: Uuid,
        medicine_id: Uuid,
    ) -> AppResult<Vec<StockBatch>> {
        let rows = sqlx::query_as::<_, StockBatchRow>(&format!(
            r#"
            SELECT {}
            FROM stock_batches
            WHERE hospital_id = $1 AND medicine_id = $2
            ORDER BY purchase_date DESC, created_at DESC
            "#,
            BATCH_COLUMNS
        ))
        .bind(hospital_id)
        .bind(medicine_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockBatchRow::into_model).collect()
    }

    /// Batches with remaining stock expiring within the window
    pub async fn expiring_batches(
        &self,
        hospital_id: Uuid,
        within_days: i64,
    ) -> AppResult<Vec<StockBatch>> {
        let today = Utc::now().date_naive();
        let rows = sqlx::query_as::<_, StockBatchRow>(&format!(
            r#"
            SELECT {}
            FROM stock_batches
            WHERE hospital_id = $1 AND available_quantity > 0
              AND expiry_date >= $2 AND expiry_date <= $3
            ORDER BY expiry_date ASC
            "#,
            BATCH_COLUMNS
        ))
        .bind(hospital_id)
        .bind(today)
        .bind(today + Duration::days(within_days))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockBatchRow::into_model).collect()
    }

    /// Batches already past expiry that still show remaining stock
    pub async fn expired_batches(&self, hospital_id: Uuid) -> AppResult<Vec<StockBatch>> {
        let today = Utc::now().date_naive();
        let rows = sqlx::query_as::<_, StockBatchRow>(&format!(
            r#"
            SELECT {}
            FROM stock_batches
            WHERE hospital_id = $1 AND available_quantity > 0 AND expiry_date < $2
            ORDER BY expiry_date ASC
            "#,
            BATCH_COLUMNS
        ))
        .bind(hospital_id)
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockBatchRow::into_model).collect()
    }

    async fn update_medicine_totals(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        medicine_id: Uuid,
        new_avg: Decimal,
        new_total_stock: Decimal,
        version: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE medicines
            SET average_buy_price = $1, total_stock = $2, version = version + 1,
                updated_at = NOW()
            WHERE id = $3 AND version = $4
            "#,
        )
        .bind(new_avg)
        .bind(new_total_stock)
        .bind(medicine_id)
        .bind(version)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "medicine stock was modified concurrently".to_string(),
            ));
        }
        Ok(())
    }

    async fn update_vendor_balance(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        vendor_id: Uuid,
        balance_after: Decimal,
        version: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE vendors
            SET current_balance = $1, version = version + 1, updated_at = NOW()
            WHERE id = $2 AND version = $3
            "#,
        )
        .bind(balance_after)
        .bind(vendor_id)
        .bind(version)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "vendor balance was modified concurrently".to_string(),
            ));
        }
        Ok(())
    }
}
