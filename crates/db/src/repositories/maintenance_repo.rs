//! Repository for the `maintenance_logs` table.

use fleetflow_core::fleet::{MaintenanceLog, MaintenanceStatus};
use fleetflow_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::maintenance::{MaintenanceListQuery, MaintenanceRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, vehicle_id, service_type, cost, notes, status, created_at, completed_at";

pub struct MaintenanceRepo;

impl MaintenanceRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MaintenanceLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_logs WHERE id = $1");
        sqlx::query_as::<_, MaintenanceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(MaintenanceLog::try_from)
            .transpose()
    }

    /// List logs matching the filters, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &MaintenanceListQuery,
    ) -> Result<Vec<MaintenanceLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_logs
             WHERE ($1::BIGINT IS NULL OR vehicle_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, MaintenanceRow>(&query)
            .bind(params.vehicle_id)
            .bind(params.status.map(MaintenanceStatus::as_str))
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(MaintenanceLog::try_from)
            .collect()
    }

    /// Fetch a log and hold a row lock on it until the transaction ends.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<MaintenanceLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_logs WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, MaintenanceRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(MaintenanceLog::try_from)
            .transpose()
    }

    /// Insert an In Progress log.
    pub async fn insert(
        conn: &mut PgConnection,
        vehicle_id: DbId,
        service_type: &str,
        cost: f64,
        notes: Option<&str>,
    ) -> Result<MaintenanceLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_logs (vehicle_id, service_type, cost, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRow>(&query)
            .bind(vehicle_id)
            .bind(service_type)
            .bind(cost)
            .bind(notes)
            .fetch_one(conn)
            .await?
            .try_into()
    }

    /// Mark a log Completed. Returns `None` if no row with the given `id` exists.
    pub async fn mark_completed(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<MaintenanceLog>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_logs SET status = $2, completed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRow>(&query)
            .bind(id)
            .bind(MaintenanceStatus::Completed.as_str())
            .fetch_optional(conn)
            .await?
            .map(MaintenanceLog::try_from)
            .transpose()
    }

    /// Count In Progress logs for a vehicle.
    pub async fn count_open_for_vehicle(
        conn: &mut PgConnection,
        vehicle_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM maintenance_logs WHERE vehicle_id = $1 AND status = $2",
        )
        .bind(vehicle_id)
        .bind(MaintenanceStatus::InProgress.as_str())
        .fetch_one(conn)
        .await?;
        Ok(row.0)
    }
}
