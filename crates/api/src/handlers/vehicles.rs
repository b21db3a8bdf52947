//! Handlers for vehicle registration, lookup and manual status changes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use fleetflow_core::error::CoreError;
use fleetflow_core::fleet::{check_release_from_shop, validate_manual_vehicle_status};
use fleetflow_core::types::DbId;
use fleetflow_db::models::vehicle::{CreateVehicle, UpdateVehicleStatus, VehicleListQuery};
use fleetflow_db::repositories::{MaintenanceRepo, VehicleRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /vehicles
// ---------------------------------------------------------------------------

pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<VehicleListQuery>,
) -> AppResult<impl IntoResponse> {
    let vehicles = VehicleRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: vehicles }))
}

// ---------------------------------------------------------------------------
// POST /vehicles
// ---------------------------------------------------------------------------

/// Register a vehicle. It starts Available.
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(input): Json<CreateVehicle>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let vehicle = VehicleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        vehicle_id = vehicle.id,
        plate = %vehicle.plate,
        vehicle_type = %vehicle.vehicle_type,
        "Vehicle registered",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: vehicle })))
}

// ---------------------------------------------------------------------------
// GET /vehicles/{id}
// ---------------------------------------------------------------------------

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let vehicle = VehicleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Vehicle", id))?;
    Ok(Json(DataResponse { data: vehicle }))
}

// ---------------------------------------------------------------------------
// PATCH /vehicles/{id}/status
// ---------------------------------------------------------------------------

/// Operator status change. On Trip is owned by the trip lifecycle and can
/// neither be set nor cleared here. A vehicle with open maintenance logs
/// cannot be made Available.
///
/// The row is locked so the change cannot interleave with a dispatch.
pub async fn update_vehicle_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVehicleStatus>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let mut vehicle = VehicleRepo::lock_by_id(&mut *tx, id)
        .await?
        .ok_or(CoreError::not_found("Vehicle", id))?;
    validate_manual_vehicle_status(vehicle.status, input.status)?;
    let open_logs = MaintenanceRepo::count_open_for_vehicle(&mut *tx, id).await?;
    check_release_from_shop(input.status, open_logs)?;

    VehicleRepo::update_status(&mut *tx, id, input.status).await?;
    tx.commit().await?;

    tracing::info!(
        vehicle_id = id,
        from = %vehicle.status,
        to = %input.status,
        "Vehicle status changed",
    );

    vehicle.status = input.status;
    Ok(Json(DataResponse { data: vehicle }))
}
