//! Sales service
//!
//! Finalizes counter sales from line items, decrements batch stock, and
//! keeps the sale's paid/due/status fields consistent. Editing a sale uses
//! add-back-then-subtract: the previously sold quantities are restored
//! first, then the new items are applied, so the end state matches a sale
//! re-created from scratch.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Sale, SaleItem};
use shared::payment::{finalize_sale, SaleLine, SaleTotals};
use shared::types::{DiscountType, PaymentMethod, PaymentStatus};

/// Sale service for counter transactions
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Row mapping for the sales table
#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    hospital_id: Uuid,
    invoice_number: String,
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    total_amount: Decimal,
    paid_amount: Decimal,
    due_amount: Decimal,
    total_profit: Decimal,
    payment_status: String,
    payment_method: String,
    sale_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_model(self) -> AppResult<Sale> {
        let payment_status = PaymentStatus::from_str(&self.payment_status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "unknown payment status '{}'",
                self.payment_status
            ))
        })?;
        let payment_method = PaymentMethod::from_str(&self.payment_method).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "unknown payment method '{}'",
                self.payment_method
            ))
        })?;
        Ok(Sale {
            id: self.id,
            hospital_id: self.hospital_id,
            invoice_number: self.invoice_number,
            subtotal: self.subtotal,
            discount: self.discount,
            tax: self.tax,
            total_amount: self.total_amount,
            paid_amount: self.paid_amount,
            due_amount: self.due_amount,
            total_profit: self.total_profit,
            payment_status,
            payment_method,
            sale_date: self.sale_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SALE_COLUMNS: &str = "id, hospital_id, invoice_number, subtotal, discount, tax, \
     total_amount, paid_amount, due_amount, total_profit, payment_status, payment_method, \
     sale_date, created_at, updated_at";

/// Row mapping for the sale_items table
#[derive(Debug, FromRow)]
struct SaleItemRow {
    id: Uuid,
    sale_id: Uuid,
    stock_batch_id: Uuid,
    medicine_id: Uuid,
    quantity: Decimal,
    unit_price: Decimal,
    buy_price: Decimal,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            stock_batch_id: row.stock_batch_id,
            medicine_id: row.medicine_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            buy_price: row.buy_price,
        }
    }
}

/// One requested line of a sale
#[derive(Debug, Deserialize)]
pub struct SaleItemInput {
    pub stock_batch_id: Uuid,
    pub quantity: Decimal,
    /// Defaults to the batch's sale price when omitted
    pub unit_price: Option<Decimal>,
}

/// Input for creating or editing a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub items: Vec<SaleItemInput>,
    pub discount: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub tax: Decimal,
    pub paid_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub sale_date: Option<NaiveDate>,
}

/// A sale together with its line items
#[derive(Debug, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Batch fields needed to build and apply sale lines
#[derive(Debug, FromRow)]
struct BatchPick {
    id: Uuid,
    medicine_id: Uuid,
    available_quantity: Decimal,
    buy_price: Decimal,
    sale_price: Decimal,
}

/// A resolved line: input joined with its batch snapshot
struct ResolvedLine {
    stock_batch_id: Uuid,
    medicine_id: Uuid,
    quantity: Decimal,
    unit_price: Decimal,
    buy_price: Decimal,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a sale: validate items against batch availability, derive the
    /// financial summary, and decrement stock, all in one transaction.
    pub async fn create_sale(
        &self,
        hospital_id: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<SaleWithItems> {
        let mut tx = self.db.begin().await?;

        let (lines, totals) = self.resolve_and_finalize(&mut tx, hospital_id, &input).await?;

        let sale_date = input.sale_date.unwrap_or_else(|| Utc::now().date_naive());
        let invoice_number = self.next_invoice_number(&mut tx, sale_date).await?;

        let sale_row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            INSERT INTO sales (
                hospital_id, invoice_number, subtotal, discount, tax, total_amount,
                paid_amount, due_amount, total_profit, payment_status, payment_method,
                sale_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(hospital_id)
        .bind(&invoice_number)
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.tax)
        .bind(totals.total)
        .bind(totals.paid)
        .bind(totals.due)
        .bind(totals.profit)
        .bind(totals.status.as_str())
        .bind(input.payment_method.as_str())
        .bind(sale_date)
        .fetch_one(&mut *tx)
        .await?;

        let items = self.insert_items(&mut tx, sale_row.id, &lines).await?;
        self.subtract_stock(&mut tx, &lines).await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale_row.id,
            invoice = %invoice_number,
            total = %totals.total,
            "recorded sale"
        );

        Ok(SaleWithItems {
            sale: sale_row.into_model()?,
            items,
        })
    }

    /// Edit a sale. Previously sold quantities are added back to their
    /// batches before the new items are validated and applied.
    pub async fn update_sale(
        &self,
        hospital_id: Uuid,
        sale_id: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<SaleWithItems> {
        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales WHERE id = $1 AND hospital_id = $2",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .bind(hospital_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        // Add back the old quantities
        let old_items = sqlx::query_as::<_, SaleItemRow>(
            "SELECT id, sale_id, stock_batch_id, medicine_id, quantity, unit_price, buy_price \
             FROM sale_items WHERE sale_id = $1",
        )
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &old_items {
            sqlx::query(
                "UPDATE stock_batches SET available_quantity = available_quantity + $1, \
                 updated_at = NOW() WHERE id = $2",
            )
            .bind(item.quantity)
            .bind(item.stock_batch_id)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "UPDATE medicines SET total_stock = total_stock + $1, version = version + 1, \
                 updated_at = NOW() WHERE id = $2",
            )
            .bind(item.quantity)
            .bind(item.medicine_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        // Apply the new items against the restored availability
        let (lines, totals) = self.resolve_and_finalize(&mut tx, hospital_id, &input).await?;

        let sale_date = input.sale_date.unwrap_or(existing.sale_date);
        let sale_row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            UPDATE sales
            SET subtotal = $1, discount = $2, tax = $3, total_amount = $4,
                paid_amount = $5, due_amount = $6, total_profit = $7,
                payment_status = $8, payment_method = $9, sale_date = $10,
                updated_at = NOW()
            WHERE id = $11
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.tax)
        .bind(totals.total)
        .bind(totals.paid)
        .bind(totals.due)
        .bind(totals.profit)
        .bind(totals.status.as_str())
        .bind(input.payment_method.as_str())
        .bind(sale_date)
        .bind(sale_id)
        .fetch_one(&mut *tx)
        .await?;

        let items = self.insert_items(&mut tx, sale_id, &lines).await?;
        self.subtract_stock(&mut tx, &lines).await?;

        tx.commit().await?;

        tracing::info!(sale_id = %sale_id, total = %totals.total, "updated sale");

        Ok(SaleWithItems {
            sale: sale_row.into_model()?,
            items,
        })
    }

    /// Get a sale with its items
    pub async fn get_sale(&self, hospital_id: Uuid, sale_id: Uuid) -> AppResult<SaleWithItems> {
        let sale_row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales WHERE id = $1 AND hospital_id = $2",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .bind(hospital_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItemRow>(
            "SELECT id, sale_id, stock_batch_id, medicine_id, quantity, unit_price, buy_price \
             FROM sale_items WHERE sale_id = $1",
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleWithItems {
            sale: sale_row.into_model()?,
            items: items.into_iter().map(SaleItem::from).collect(),
        })
    }

    /// List sales, optionally restricted to a date range, newest first
    pub async fn list_sales(
        &self,
        hospital_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            SELECT {}
            FROM sales
            WHERE hospital_id = $1
              AND ($2::date IS NULL OR sale_date >= $2)
              AND ($3::date IS NULL OR sale_date <= $3)
            ORDER BY sale_date DESC, created_at DESC
            "#,
            SALE_COLUMNS
        ))
        .bind(hospital_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(SaleRow::into_model).collect()
    }

    /// Lock the referenced batches, resolve line snapshots, and derive the
    /// sale totals. Batch rows are locked so concurrent sales against the
    /// same batch serialize.
    async fn resolve_and_finalize(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        hospital_id: Uuid,
        input: &CreateSaleInput,
    ) -> AppResult<(Vec<ResolvedLine>, SaleTotals)> {
        let batch_ids: Vec<Uuid> = input.items.iter().map(|i| i.stock_batch_id).collect();

        let batches = sqlx::query_as::<_, BatchPick>(
            r#"
            SELECT id, medicine_id, available_quantity, buy_price, sale_price
            FROM stock_batches
            WHERE hospital_id = $1 AND id = ANY($2)
            FOR UPDATE
            "#,
        )
        .bind(hospital_id)
        .bind(&batch_ids)
        .fetch_all(&mut **tx)
        .await?;

        let mut lines = Vec::with_capacity(input.items.len());
        let mut sale_lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let batch = batches
                .iter()
                .find(|b| b.id == item.stock_batch_id)
                .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))?;
            let unit_price = item.unit_price.unwrap_or(batch.sale_price);
            sale_lines.push(SaleLine {
                quantity: item.quantity,
                unit_price,
                buy_price: batch.buy_price,
                available_quantity: batch.available_quantity,
            });
            lines.push(ResolvedLine {
                stock_batch_id: batch.id,
                medicine_id: batch.medicine_id,
                quantity: item.quantity,
                unit_price,
                buy_price: batch.buy_price,
            });
        }

        let totals = finalize_sale(
            &sale_lines,
            input.discount,
            input.discount_type,
            input.tax,
            input.paid_amount,
        )?;

        Ok((lines, totals))
    }

    async fn insert_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale_id: Uuid,
        lines: &[ResolvedLine],
    ) -> AppResult<Vec<SaleItem>> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, SaleItemRow>(
                r#"
                INSERT INTO sale_items (sale_id, stock_batch_id, medicine_id, quantity, unit_price, buy_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, sale_id, stock_batch_id, medicine_id, quantity, unit_price, buy_price
                "#,
            )
            .bind(sale_id)
            .bind(line.stock_batch_id)
            .bind(line.medicine_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.buy_price)
            .fetch_one(&mut **tx)
            .await?;
            items.push(row.into());
        }
        Ok(items)
    }

    /// Decrement batch and medicine stock. The guarded updates catch a
    /// cumulative over-draw when several lines reference one batch.
    async fn subtract_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        lines: &[ResolvedLine],
    ) -> AppResult<()> {
        for line in lines {
            let result = sqlx::query(
                r#"
                UPDATE stock_batches
                SET available_quantity = available_quantity - $1, updated_at = NOW()
                WHERE id = $2 AND available_quantity >= $1
                "#,
            )
            .bind(line.quantity)
            .bind(line.stock_batch_id)
            .execute(&mut **tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::InsufficientStock(format!(
                    "batch {} cannot cover the requested quantity",
                    line.stock_batch_id
                )));
            }

            let result = sqlx::query(
                r#"
                UPDATE medicines
                SET total_stock = total_stock - $1, version = version + 1, updated_at = NOW()
                WHERE id = $2 AND total_stock >= $1
                "#,
            )
            .bind(line.quantity)
            .bind(line.medicine_id)
            .execute(&mut **tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::Conflict(
                    "medicine stock was modified concurrently".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn next_invoice_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale_date: NaiveDate,
    ) -> AppResult<String> {
        let sequence: i64 = sqlx::query_scalar("SELECT nextval('sale_invoice_seq')")
            .fetch_one(&mut **tx)
            .await?;
        Ok(format!("INV-{}-{:05}", sale_date.year(), sequence))
    }
}
