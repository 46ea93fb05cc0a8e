//! Medicine catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::Medicine;
use shared::validation::validate_amount;

/// Medicine service for catalog management and low-stock queries
#[derive(Clone)]
pub struct MedicineService {
    db: PgPool,
}

/// Row mapping for the medicines table
#[derive(Debug, FromRow)]
struct MedicineRow {
    id: Uuid,
    hospital_id: Uuid,
    name: String,
    generic_name: Option<String>,
    unit: String,
    sale_price: Decimal,
    average_buy_price: Decimal,
    total_stock: Decimal,
    reorder_level: Decimal,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MedicineRow> for Medicine {
    fn from(row: MedicineRow) -> Self {
        Medicine {
            id: row.id,
            hospital_id: row.hospital_id,
            name: row.name,
            generic_name: row.generic_name,
            unit: row.unit,
            sale_price: row.sale_price,
            average_buy_price: row.average_buy_price,
            total_stock: row.total_stock,
            reorder_level: row.reorder_level,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const MEDICINE_COLUMNS: &str = "id, hospital_id, name, generic_name, unit, sale_price, \
     average_buy_price, total_stock, reorder_level, version, created_at, updated_at";

/// Input for creating a medicine
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMedicineInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub generic_name: Option<String>,
    #[validate(length(min = 1, message = "unit is required"))]
    pub unit: String,
    pub sale_price: Decimal,
    pub reorder_level: Option<Decimal>,
}

/// Input for updating a medicine
#[derive(Debug, Deserialize)]
pub struct UpdateMedicineInput {
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub unit: Option<String>,
    pub sale_price: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
}

impl MedicineService {
    /// Create a new MedicineService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a medicine in the catalog
    pub async fn create_medicine(
        &self,
        hospital_id: Uuid,
        input: CreateMedicineInput,
    ) -> AppResult<Medicine> {
        input.validate().map_err(|e| AppError::Validation {
            field: None,
            message: e.to_string(),
        })?;
        validate_amount("sale_price", input.sale_price)?;
        let reorder_level = input.reorder_level.unwrap_or(Decimal::ZERO);
        validate_amount("reorder_level", reorder_level)?;

        let row = sqlx::query_as::<_, MedicineRow>(&format!(
            r#"
            INSERT INTO medicines (hospital_id, name, generic_name, unit, sale_price, reorder_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MEDICINE_COLUMNS
        ))
        .bind(hospital_id)
        .bind(&input.name)
        .bind(&input.generic_name)
        .bind(&input.unit)
        .bind(input.sale_price)
        .bind(reorder_level)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a medicine by ID
    pub async fn get_medicine(&self, hospital_id: Uuid, medicine_id: Uuid) -> AppResult<Medicine> {
        let row = sqlx::query_as::<_, MedicineRow>(&format!(
            "SELECT {} FROM medicines WHERE id = $1 AND hospital_id = $2",
            MEDICINE_COLUMNS
        ))
        .bind(medicine_id)
        .bind(hospital_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Medicine".to_string()))?;

        Ok(row.into())
    }

    /// List all medicines for a hospital
    pub async fn list_medicines(&self, hospital_id: Uuid) -> AppResult<Vec<Medicine>> {
        let rows = sqlx::query_as::<_, MedicineRow>(&format!(
            "SELECT {} FROM medicines WHERE hospital_id = $1 ORDER BY name ASC",
            MEDICINE_COLUMNS
        ))
        .bind(hospital_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Medicine::from).collect())
    }

    /// Update catalog fields of a medicine.
    /// Stock and cost fields are owned by the stock service.
    pub async fn update_medicine(
        &self,
        hospital_id: Uuid,
        medicine_id: Uuid,
        input: UpdateMedicineInput,
    ) -> AppResult<Medicine> {
        let existing = self.get_medicine(hospital_id, medicine_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let generic_name = input.generic_name.or(existing.generic_name);
        let unit = input.unit.unwrap_or(existing.unit);
        let sale_price = input.sale_price.unwrap_or(existing.sale_price);
        let reorder_level = input.reorder_level.unwrap_or(existing.reorder_level);

        shared::validation::validate_name("name", &name)?;
        validate_amount("sale_price", sale_price)?;
        validate_amount("reorder_level", reorder_level)?;

        let row = sqlx::query_as::<_, MedicineRow>(&format!(
            r#"
            UPDATE medicines
            SET name = $1, generic_name = $2, unit = $3, sale_price = $4,
                reorder_level = $5, updated_at = NOW()
            WHERE id = $6 AND hospital_id = $7
            RETURNING {}
            "#,
            MEDICINE_COLUMNS
        ))
        .bind(&name)
        .bind(&generic_name)
        .bind(&unit)
        .bind(sale_price)
        .bind(reorder_level)
        .bind(medicine_id)
        .bind(hospital_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List medicines at or below their reorder level
    pub async fn list_low_stock(&self, hospital_id: Uuid) -> AppResult<Vec<Medicine>> {
        let rows = sqlx::query_as::<_, MedicineRow>(&format!(
            r#"
            SELECT {}
            FROM medicines
            WHERE hospital_id = $1 AND total_stock <= reorder_level
            ORDER BY total_stock ASC
            "#,
            MEDICINE_COLUMNS
        ))
        .bind(hospital_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Medicine::from).collect())
    }
}
