//! Repository for the `vehicles` table.

use fleetflow_core::fleet::{Vehicle, VehicleStatus, VehicleType};
use fleetflow_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::vehicle::{CreateVehicle, VehicleListQuery, VehicleRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, model, plate, vehicle_type, max_capacity, odometer, \
    status, region, acquisition_cost, created_at";

pub struct VehicleRepo;

impl VehicleRepo {
    /// Register a vehicle. It starts Available.
    pub async fn create(pool: &PgPool, input: &CreateVehicle) -> Result<Vehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles
                (name, model, plate, vehicle_type, max_capacity, odometer, region, acquisition_cost)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), COALESCE($7, 'Central'), COALESCE($8, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(input.name.trim())
            .bind(input.model.trim())
            .bind(input.plate.trim())
            .bind(input.vehicle_type.as_str())
            .bind(input.max_capacity)
            .bind(input.odometer)
            .bind(input.region.as_deref())
            .bind(input.acquisition_cost)
            .fetch_one(pool)
            .await?
            .try_into()
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE id = $1");
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    /// List vehicles matching the filters, newest first.
    pub async fn list(pool: &PgPool, params: &VehicleListQuery) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vehicles
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR vehicle_type = $2)
               AND (NOT $3 OR status = 'Available')
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(params.status.map(VehicleStatus::as_str))
            .bind(params.vehicle_type.map(VehicleType::as_str))
            .bind(params.available_only.unwrap_or(false))
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
    }

    /// Fetch a vehicle and hold a row lock on it until the transaction ends.
    pub async fn lock_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    /// Returns `true` if a row was updated.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        status: VehicleStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE vehicles SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` if a row was updated.
    pub async fn update_odometer(
        conn: &mut PgConnection,
        id: DbId,
        odometer: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE vehicles SET odometer = $2 WHERE id = $1")
            .bind(id)
            .bind(odometer)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
