//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        CreateEquipment, Equipment, EquipmentFilterRequest, EquipmentIdQuery, UpdateEquipment,
    },
    services::parse_uuid,
};

/// Acknowledgement body for deletes
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

fn required_id(query: &EquipmentIdQuery) -> AppResult<Uuid> {
    let id = query
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("ID is required (query parameter)".to_string()))?;
    parse_uuid("id", id)
}

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment_query.list_all().await?;
    Ok(Json(equipment))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = String, Path, description = "Equipment UUID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Equipment>> {
    let id = parse_uuid("id", &id)?;
    let equipment = state.services.equipment_query.get(id).await?;
    Ok(Json(equipment))
}

/// Filter and sort equipment
#[utoipa::path(
    post,
    path = "/equipment/filter",
    tag = "equipment",
    request_body = EquipmentFilterRequest,
    responses(
        (status = 200, description = "Filtered equipment", body = Vec<Equipment>),
        (status = 400, description = "Malformed filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn filter_equipment(
    State(state): State<crate::AppState>,
    WithRejection(Json(request), _): WithRejection<Json<EquipmentFilterRequest>, AppError>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment_query.list(&request).await?;
    Ok(Json(equipment))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    WithRejection(Json(data), _): WithRejection<Json<CreateEquipment>, AppError>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let equipment = state.services.equipment_commands.create(&data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment",
    tag = "equipment",
    params(EquipmentIdQuery),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 400, description = "Missing id or invalid fields", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    Query(query): Query<EquipmentIdQuery>,
    WithRejection(Json(data), _): WithRejection<Json<UpdateEquipment>, AppError>,
) -> AppResult<Json<Equipment>> {
    let id = required_id(&query)?;
    let equipment = state.services.equipment_commands.update(id, &data).await?;
    Ok(Json(equipment))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment",
    tag = "equipment",
    params(EquipmentIdQuery),
    responses(
        (status = 200, description = "Equipment deleted", body = SuccessResponse),
        (status = 400, description = "Missing id", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    Query(query): Query<EquipmentIdQuery>,
) -> AppResult<Json<SuccessResponse>> {
    let id = required_id(&query)?;
    state.services.equipment_commands.delete(id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
