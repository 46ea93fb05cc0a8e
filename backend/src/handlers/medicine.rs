//! HTTP handlers for the medicine catalog

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::medicine::{CreateMedicineInput, MedicineService, UpdateMedicineInput};
use crate::models::Medicine;
use crate::AppState;

/// Create a medicine
pub async fn create_medicine(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateMedicineInput>,
) -> AppResult<Json<Medicine>> {
    let service = MedicineService::new(state.db);
    let medicine = service
        .create_medicine(current_user.0.hospital_id, input)
        .await?;
    Ok(Json(medicine))
}

/// Get a medicine
pub async fn get_medicine(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(medicine_id): Path<Uuid>,
) -> AppResult<Json<Medicine>> {
    let service = MedicineService::new(state.db);
    let medicine = service
        .get_medicine(current_user.0.hospital_id, medicine_id)
        .await?;
    Ok(Json(medicine))
}

/// List medicines for the hospital, flagging those at or below their
/// reorder level
pub async fn list_medicines(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<MedicineListEntry>>> {
    let service = MedicineService::new(state.db);
    let medicines = service.list_medicines(current_user.0.hospital_id).await?;

    let response = medicines
        .into_iter()
        .map(|medicine| MedicineListEntry {
            low_stock: medicine.is_low_stock(),
            medicine,
        })
        .collect();

    Ok(Json(response))
}

/// Update a medicine's catalog fields
pub async fn update_medicine(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(medicine_id): Path<Uuid>,
    Json(input): Json<UpdateMedicineInput>,
) -> AppResult<Json<Medicine>> {
    let service = MedicineService::new(state.db);
    let medicine = service
        .update_medicine(current_user.0.hospital_id, medicine_id, input)
        .await?;
    Ok(Json(medicine))
}

/// A catalog entry with its derived reorder flag
#[derive(Debug, serde::Serialize)]
pub struct MedicineListEntry {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub low_stock: bool,
}

/// List medicines at or below their reorder level
pub async fn list_low_stock_medicines(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Medicine>>> {
    let service = MedicineService::new(state.db);
    let medicines = service.list_low_stock(current_user.0.hospital_id).await?;
    Ok(Json(medicines))
}
