//! Handlers for the trip lifecycle.
//!
//! Transitions are delegated to [`TripLifecycle`](fleetflow_core::trip_lifecycle::TripLifecycle)
//! held in [`AppState`]; these handlers only translate HTTP.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use fleetflow_core::error::CoreError;
use fleetflow_core::trip_lifecycle::CreateTrip;
use fleetflow_core::types::DbId;
use fleetflow_db::models::trip::{CompleteTrip, TripListQuery};
use fleetflow_db::repositories::TripRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /trips
// ---------------------------------------------------------------------------

/// List trips, newest first.
pub async fn list_trips(
    State(state): State<AppState>,
    Query(params): Query<TripListQuery>,
) -> AppResult<impl IntoResponse> {
    let trips = TripRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: trips }))
}

// ---------------------------------------------------------------------------
// GET /trips/{id}
// ---------------------------------------------------------------------------

pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let trip = TripRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Trip", id))?;
    Ok(Json(DataResponse { data: trip }))
}

// ---------------------------------------------------------------------------
// POST /trips
// ---------------------------------------------------------------------------

/// Plan a Draft trip. Eligibility failures return 422 with the reason.
pub async fn create_trip(
    State(state): State<AppState>,
    Json(input): Json<CreateTrip>,
) -> AppResult<impl IntoResponse> {
    let trip = state.trips.create_trip(&input).await?;

    tracing::info!(
        trip_id = trip.id,
        vehicle_id = trip.vehicle_id,
        driver_id = trip.driver_id,
        cargo_weight = trip.cargo_weight,
        "Trip created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: trip })))
}

// ---------------------------------------------------------------------------
// PATCH /trips/{id}/dispatch
// ---------------------------------------------------------------------------

pub async fn dispatch_trip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let trip = state.trips.dispatch_trip(id).await?;

    tracing::info!(
        trip_id = trip.id,
        vehicle_id = trip.vehicle_id,
        driver_id = trip.driver_id,
        "Trip dispatched",
    );

    Ok(Json(DataResponse { data: trip }))
}

// ---------------------------------------------------------------------------
// PATCH /trips/{id}/complete
// ---------------------------------------------------------------------------

/// Complete a dispatched trip. The body is optional; an empty body or a
/// missing `odometer_end` keeps the vehicle odometer at the trip start.
pub async fn complete_trip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: CompleteTrip = if body.iter().all(u8::is_ascii_whitespace) {
        CompleteTrip::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let trip = state.trips.complete_trip(id, input.odometer_end).await?;

    tracing::info!(
        trip_id = trip.id,
        vehicle_id = trip.vehicle_id,
        driver_id = trip.driver_id,
        odometer_end = ?trip.odometer_end,
        "Trip completed",
    );

    Ok(Json(DataResponse { data: trip }))
}

// ---------------------------------------------------------------------------
// PATCH /trips/{id}/cancel
// ---------------------------------------------------------------------------

pub async fn cancel_trip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let trip = state.trips.cancel_trip(id).await?;

    tracing::info!(
        trip_id = trip.id,
        vehicle_id = trip.vehicle_id,
        driver_id = trip.driver_id,
        "Trip cancelled",
    );

    Ok(Json(DataResponse { data: trip }))
}
