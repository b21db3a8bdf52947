//! Maintenance log rows and DTOs.

use fleetflow_core::fleet::{MaintenanceLog, MaintenanceStatus};
use fleetflow_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

use super::decode_label;

/// A row from the `maintenance_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct MaintenanceRow {
    pub id: DbId,
    pub vehicle_id: DbId,
    pub service_type: String,
    pub cost: f64,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl TryFrom<MaintenanceRow> for MaintenanceLog {
    type Error = sqlx::Error;

    fn try_from(row: MaintenanceRow) -> Result<Self, Self::Error> {
        Ok(MaintenanceLog {
            status: decode_label("status", &row.status)?,
            id: row.id,
            vehicle_id: row.vehicle_id,
            service_type: row.service_type,
            cost: row.cost,
            notes: row.notes,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

/// DTO for opening a maintenance log.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMaintenance {
    pub vehicle_id: Option<DbId>,
    pub service_type: Option<String>,
    /// Defaults to 0.
    #[validate(range(min = 0.0, message = "Cost cannot be negative"))]
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

/// Query filters for listing maintenance logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaintenanceListQuery {
    pub vehicle_id: Option<DbId>,
    pub status: Option<MaintenanceStatus>,
}
