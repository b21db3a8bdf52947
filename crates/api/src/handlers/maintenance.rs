//! Handlers for vehicle maintenance logs.
//!
//! Opening a log sends the vehicle to the shop; closing the last open log
//! returns it to service. Both lock the vehicle row, so neither can
//! interleave with a dispatch of the same vehicle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use fleetflow_core::error::CoreError;
use fleetflow_core::fleet::{check_maintenance_open, check_vehicle_serviceable, VehicleStatus};
use fleetflow_core::types::DbId;
use fleetflow_db::models::maintenance::{CreateMaintenance, MaintenanceListQuery};
use fleetflow_db::repositories::{MaintenanceRepo, VehicleRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /maintenance
// ---------------------------------------------------------------------------

pub async fn list_maintenance(
    State(state): State<AppState>,
    Query(params): Query<MaintenanceListQuery>,
) -> AppResult<impl IntoResponse> {
    let logs = MaintenanceRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: logs }))
}

// ---------------------------------------------------------------------------
// POST /maintenance
// ---------------------------------------------------------------------------

pub async fn open_maintenance(
    State(state): State<AppState>,
    Json(input): Json<CreateMaintenance>,
) -> AppResult<impl IntoResponse> {
    let service_type = input
        .service_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let (Some(vehicle_id), Some(service_type)) = (input.vehicle_id, service_type) else {
        return Err(CoreError::Validation("Vehicle and service type required".into()).into());
    };
    input.validate()?;

    let mut tx = state.pool.begin().await?;

    let vehicle = VehicleRepo::lock_by_id(&mut *tx, vehicle_id)
        .await?
        .ok_or(CoreError::not_found("Vehicle", vehicle_id))?;
    check_vehicle_serviceable(&vehicle)?;

    let log = MaintenanceRepo::insert(
        &mut *tx,
        vehicle.id,
        service_type,
        input.cost.unwrap_or(0.0),
        input.notes.as_deref(),
    )
    .await?;
    VehicleRepo::update_status(&mut *tx, vehicle.id, VehicleStatus::InShop).await?;
    tx.commit().await?;

    tracing::info!(
        maintenance_id = log.id,
        vehicle_id = vehicle.id,
        service_type = %log.service_type,
        "Maintenance opened",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: log })))
}

// ---------------------------------------------------------------------------
// PATCH /maintenance/{id}/complete
// ---------------------------------------------------------------------------

/// Close a log. The vehicle goes back to Available only when it is still
/// In Shop and no other log for it remains open.
pub async fn complete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let log = MaintenanceRepo::lock_by_id(&mut *tx, id)
        .await?
        .ok_or(CoreError::not_found("Maintenance log", id))?;
    check_maintenance_open(&log)?;

    let vehicle = VehicleRepo::lock_by_id(&mut *tx, log.vehicle_id)
        .await?
        .ok_or(CoreError::not_found("Vehicle", log.vehicle_id))?;

    let completed = MaintenanceRepo::mark_completed(&mut *tx, id)
        .await?
        .ok_or(CoreError::not_found("Maintenance log", id))?;
    let still_open = MaintenanceRepo::count_open_for_vehicle(&mut *tx, vehicle.id).await?;
    let released = still_open == 0 && vehicle.status == VehicleStatus::InShop;
    if released {
        VehicleRepo::update_status(&mut *tx, vehicle.id, VehicleStatus::Available).await?;
    }
    tx.commit().await?;

    tracing::info!(
        maintenance_id = completed.id,
        vehicle_id = vehicle.id,
        still_open,
        released,
        "Maintenance completed",
    );

    Ok(Json(DataResponse { data: completed }))
}
