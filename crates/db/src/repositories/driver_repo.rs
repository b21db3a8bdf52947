//! Repository for the `drivers` table.

use fleetflow_core::fleet::{Driver, DriverStatus};
use fleetflow_core::trip_lifecycle::DriverCounter;
use fleetflow_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::driver::{CreateDriver, DriverListQuery, DriverRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, license_number, license_category, license_expiry, \
    safety_score, status, trips_completed, trips_cancelled, created_at";

pub struct DriverRepo;

impl DriverRepo {
    /// Register a driver. They start Off Duty with zeroed counters.
    ///
    /// `license_category` is stored as given; callers normalise it first.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDriver,
        license_category: &str,
    ) -> Result<Driver, sqlx::Error> {
        let query = format!(
            "INSERT INTO drivers (name, license_number, license_category, license_expiry, safety_score)
             VALUES ($1, $2, $3, $4, COALESCE($5, 100))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DriverRow>(&query)
            .bind(input.name.trim())
            .bind(input.license_number.trim())
            .bind(license_category)
            .bind(input.license_expiry)
            .bind(input.safety_score)
            .fetch_one(pool)
            .await?
            .try_into()
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drivers WHERE id = $1");
        sqlx::query_as::<_, DriverRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Driver::try_from)
            .transpose()
    }

    /// List drivers matching the filters, newest first.
    ///
    /// `available_only` keeps Off Duty drivers whose license is valid today.
    pub async fn list(pool: &PgPool, params: &DriverListQuery) -> Result<Vec<Driver>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM drivers
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND (NOT $2 OR (status = 'Off Duty' AND license_expiry >= CURRENT_DATE))
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, DriverRow>(&query)
            .bind(params.status.map(DriverStatus::as_str))
            .bind(params.available_only.unwrap_or(false))
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Driver::try_from)
            .collect()
    }

    /// Fetch a driver and hold a row lock on it until the transaction ends.
    pub async fn lock_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drivers WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DriverRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(Driver::try_from)
            .transpose()
    }

    /// Returns `true` if a row was updated.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        status: DriverStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE drivers SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add one to a trip counter. Returns `true` if a row was updated.
    pub async fn increment_counter(
        conn: &mut PgConnection,
        id: DbId,
        counter: DriverCounter,
    ) -> Result<bool, sqlx::Error> {
        let column = counter.column();
        let query = format!("UPDATE drivers SET {column} = {column} + 1 WHERE id = $1");
        let result = sqlx::query(&query).bind(id).execute(conn).await?;
        Ok(result.rows_affected() > 0)
    }
}
