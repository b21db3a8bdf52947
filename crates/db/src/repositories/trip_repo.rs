//! Repository for the `trips` table.
//!
//! Status changes go through [`crate::PgTripStore`]; the functions here that
//! take a connection are its building blocks.

use fleetflow_core::fleet::{Trip, TripStatus};
use fleetflow_core::trip_lifecycle::{NewTrip, TripStatusUpdate};
use fleetflow_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::trip::{TripListQuery, TripRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, vehicle_id, driver_id, origin, destination, cargo_weight, status, \
    odometer_start, odometer_end, created_at, dispatched_at, completed_at";

pub struct TripRepo;

impl TripRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trips WHERE id = $1");
        sqlx::query_as::<_, TripRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Trip::try_from)
            .transpose()
    }

    /// List trips matching the filters, newest first.
    pub async fn list(pool: &PgPool, params: &TripListQuery) -> Result<Vec<Trip>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trips
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR vehicle_id = $2)
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, TripRow>(&query)
            .bind(params.status.map(TripStatus::as_str))
            .bind(params.vehicle_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Trip::try_from)
            .collect()
    }

    /// Fetch a trip and hold a row lock on it until the transaction ends.
    pub async fn lock_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trips WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, TripRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(Trip::try_from)
            .transpose()
    }

    /// Insert a Draft trip.
    pub async fn insert(conn: &mut PgConnection, trip: &NewTrip) -> Result<Trip, sqlx::Error> {
        let query = format!(
            "INSERT INTO trips
                (vehicle_id, driver_id, origin, destination, cargo_weight, status, odometer_start, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripRow>(&query)
            .bind(trip.vehicle_id)
            .bind(trip.driver_id)
            .bind(&trip.origin)
            .bind(&trip.destination)
            .bind(trip.cargo_weight)
            .bind(TripStatus::Draft.as_str())
            .bind(trip.odometer_start)
            .bind(trip.created_at)
            .fetch_one(conn)
            .await?
            .try_into()
    }

    /// Set the status and any supplied timestamps / closing odometer.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        update: &TripStatusUpdate,
    ) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!(
            "UPDATE trips SET
                status = $2,
                dispatched_at = COALESCE($3, dispatched_at),
                completed_at = COALESCE($4, completed_at),
                odometer_end = COALESCE($5, odometer_end)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripRow>(&query)
            .bind(id)
            .bind(update.status.as_str())
            .bind(update.dispatched_at)
            .bind(update.completed_at)
            .bind(update.odometer_end)
            .fetch_optional(conn)
            .await?
            .map(Trip::try_from)
            .transpose()
    }
}
