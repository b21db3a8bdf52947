//! Vehicle rows and DTOs.

use fleetflow_core::fleet::{Vehicle, VehicleStatus, VehicleType};
use fleetflow_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

use super::decode_label;

/// A row from the `vehicles` table.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleRow {
    pub id: DbId,
    pub name: String,
    pub model: String,
    pub plate: String,
    pub vehicle_type: String,
    pub max_capacity: f64,
    pub odometer: f64,
    pub status: String,
    pub region: String,
    pub acquisition_cost: f64,
    pub created_at: Timestamp,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = sqlx::Error;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        Ok(Vehicle {
            vehicle_type: decode_label("vehicle_type", &row.vehicle_type)?,
            status: decode_label("status", &row.status)?,
            id: row.id,
            name: row.name,
            model: row.model,
            plate: row.plate,
            max_capacity: row.max_capacity,
            odometer: row.odometer,
            region: row.region,
            acquisition_cost: row.acquisition_cost,
            created_at: row.created_at,
        })
    }
}

/// DTO for registering a vehicle. New vehicles start Available.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicle {
    #[validate(length(min = 1, message = "Vehicle name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Vehicle model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "License plate is required"))]
    pub plate: String,
    pub vehicle_type: VehicleType,
    #[validate(range(exclusive_min = 0.0, message = "Max capacity must be positive"))]
    pub max_capacity: f64,
    /// Defaults to 0.
    #[validate(range(min = 0.0, message = "Odometer cannot be negative"))]
    pub odometer: Option<f64>,
    /// Defaults to `Central`.
    pub region: Option<String>,
    /// Defaults to 0.
    #[validate(range(min = 0.0, message = "Acquisition cost cannot be negative"))]
    pub acquisition_cost: Option<f64>,
}

/// Query filters for listing vehicles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleListQuery {
    pub status: Option<VehicleStatus>,
    pub vehicle_type: Option<VehicleType>,
    /// Only Available vehicles.
    pub available_only: Option<bool>,
}

/// Body for an operator status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVehicleStatus {
    pub status: VehicleStatus,
}
