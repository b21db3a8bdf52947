//! Handlers for driver registration, lookup and manual status changes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use fleetflow_core::error::CoreError;
use fleetflow_core::fleet::{parse_license_categories, validate_manual_driver_status, VehicleType};
use fleetflow_core::types::DbId;
use fleetflow_db::models::driver::{CreateDriver, DriverListQuery, UpdateDriverStatus};
use fleetflow_db::repositories::DriverRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /drivers
// ---------------------------------------------------------------------------

pub async fn list_drivers(
    State(state): State<AppState>,
    Query(params): Query<DriverListQuery>,
) -> AppResult<impl IntoResponse> {
    let drivers = DriverRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: drivers }))
}

// ---------------------------------------------------------------------------
// POST /drivers
// ---------------------------------------------------------------------------

/// Register a driver. They start Off Duty.
///
/// The category list is normalised (trimmed, deduplicated) before storage.
pub async fn create_driver(
    State(state): State<AppState>,
    Json(input): Json<CreateDriver>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let categories: Vec<&str> = parse_license_categories(&input.license_category)?
        .into_iter()
        .map(VehicleType::as_str)
        .collect();

    let driver = DriverRepo::create(&state.pool, &input, &categories.join(",")).await?;

    tracing::info!(
        driver_id = driver.id,
        license_category = %driver.license_category,
        "Driver registered",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: driver })))
}

// ---------------------------------------------------------------------------
// GET /drivers/{id}
// ---------------------------------------------------------------------------

pub async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let driver = DriverRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Driver", id))?;
    Ok(Json(DataResponse { data: driver }))
}

// ---------------------------------------------------------------------------
// PATCH /drivers/{id}/status
// ---------------------------------------------------------------------------

/// Operator status change, e.g. suspending a driver. On Duty is owned by
/// the trip lifecycle.
pub async fn update_driver_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDriverStatus>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let mut driver = DriverRepo::lock_by_id(&mut *tx, id)
        .await?
        .ok_or(CoreError::not_found("Driver", id))?;
    validate_manual_driver_status(driver.status, input.status)?;

    DriverRepo::update_status(&mut *tx, id, input.status).await?;
    tx.commit().await?;

    tracing::info!(
        driver_id = id,
        from = %driver.status,
        to = %input.status,
        "Driver status changed",
    );

    driver.status = input.status;
    Ok(Json(DataResponse { data: driver }))
}
