//! Trip rows and list filters.
//!
//! Trips are created through [`fleetflow_core::trip_lifecycle::CreateTrip`],
//! so there is no create DTO here.

use fleetflow_core::fleet::{Trip, TripStatus};
use fleetflow_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

use super::decode_label;

/// A row from the `trips` table.
#[derive(Debug, Clone, FromRow)]
pub struct TripRow {
    pub id: DbId,
    pub vehicle_id: DbId,
    pub driver_id: DbId,
    pub origin: String,
    pub destination: String,
    pub cargo_weight: f64,
    pub status: String,
    pub odometer_start: f64,
    pub odometer_end: Option<f64>,
    pub created_at: Timestamp,
    pub dispatched_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl TryFrom<TripRow> for Trip {
    type Error = sqlx::Error;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Trip {
            status: decode_label("status", &row.status)?,
            id: row.id,
            vehicle_id: row.vehicle_id,
            driver_id: row.driver_id,
            origin: row.origin,
            destination: row.destination,
            cargo_weight: row.cargo_weight,
            odometer_start: row.odometer_start,
            odometer_end: row.odometer_end,
            created_at: row.created_at,
            dispatched_at: row.dispatched_at,
            completed_at: row.completed_at,
        })
    }
}

/// Query filters for listing trips.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripListQuery {
    pub status: Option<TripStatus>,
    pub vehicle_id: Option<DbId>,
}

/// Body for completing a trip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteTrip {
    /// Closing odometer reading in km. Omitted or zero keeps the start reading.
    pub odometer_end: Option<f64>,
}
