//! Driver rows and DTOs.

use fleetflow_core::fleet::{Driver, DriverStatus};
use fleetflow_core::types::{Date, DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

use super::decode_label;

/// A row from the `drivers` table.
#[derive(Debug, Clone, FromRow)]
pub struct DriverRow {
    pub id: DbId,
    pub name: String,
    pub license_number: String,
    pub license_category: String,
    pub license_expiry: Date,
    pub safety_score: f64,
    pub status: String,
    pub trips_completed: i32,
    pub trips_cancelled: i32,
    pub created_at: Timestamp,
}

impl TryFrom<DriverRow> for Driver {
    type Error = sqlx::Error;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        Ok(Driver {
            status: decode_label("status", &row.status)?,
            id: row.id,
            name: row.name,
            license_number: row.license_number,
            license_category: row.license_category,
            license_expiry: row.license_expiry,
            safety_score: row.safety_score,
            trips_completed: row.trips_completed,
            trips_cancelled: row.trips_cancelled,
            created_at: row.created_at,
        })
    }
}

/// DTO for registering a driver. New drivers start Off Duty.
///
/// `license_category` is a comma-separated list of vehicle types and is
/// checked with [`fleetflow_core::fleet::parse_license_categories`] before
/// insert.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDriver {
    #[validate(length(min = 1, message = "Driver name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "License number is required"))]
    pub license_number: String,
    pub license_category: String,
    pub license_expiry: Date,
    /// Defaults to 100.
    #[validate(range(min = 0.0, max = 100.0, message = "Safety score must be between 0 and 100"))]
    pub safety_score: Option<f64>,
}

/// Query filters for listing drivers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverListQuery {
    pub status: Option<DriverStatus>,
    /// Only Off Duty drivers whose license has not expired.
    pub available_only: Option<bool>,
}

/// Body for an operator status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDriverStatus {
    pub status: DriverStatus,
}
