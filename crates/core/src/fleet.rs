//! Fleet record types: vehicles, drivers, trips and maintenance logs.
//!
//! Status and type columns are stored as their human-readable labels
//! (`"On Trip"`, `"Off Duty"`, ...), so every enum here round-trips through
//! [`as_str`](VehicleStatus::as_str) and [`FromStr`](std::str::FromStr).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Date, DbId, Timestamp};

macro_rules! define_label_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the stored label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $label => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        stringify!($name),
                        [$($label),+].join(", ")
                    ))),
                }
            }
        }
    };
}

define_label_enum! {
    /// Vehicle body class. Drivers are licensed per class.
    VehicleType {
        Truck = "Truck",
        Van = "Van",
        Bike = "Bike",
    }
}

define_label_enum! {
    /// Vehicle availability.
    VehicleStatus {
        Available = "Available",
        OnTrip = "On Trip",
        InShop = "In Shop",
        Retired = "Retired",
    }
}

define_label_enum! {
    /// Driver availability.
    DriverStatus {
        OnDuty = "On Duty",
        OffDuty = "Off Duty",
        Suspended = "Suspended",
    }
}

define_label_enum! {
    /// Trip lifecycle state.
    TripStatus {
        Draft = "Draft",
        Dispatched = "Dispatched",
        Completed = "Completed",
        Cancelled = "Cancelled",
    }
}

define_label_enum! {
    /// Maintenance log state.
    MaintenanceStatus {
        InProgress = "In Progress",
        Completed = "Completed",
    }
}

impl TripStatus {
    /// Completed and Cancelled trips accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: DbId,
    pub name: String,
    pub model: String,
    pub plate: String,
    pub vehicle_type: VehicleType,
    /// Kilograms.
    pub max_capacity: f64,
    /// Kilometres. Never decreases.
    pub odometer: f64,
    pub status: VehicleStatus,
    pub region: String,
    pub acquisition_cost: f64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub id: DbId,
    pub name: String,
    pub license_number: String,
    /// Comma-separated vehicle type labels, e.g. `"Truck,Van"`.
    pub license_category: String,
    pub license_expiry: Date,
    pub safety_score: f64,
    pub status: DriverStatus,
    pub trips_completed: i32,
    pub trips_cancelled: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub id: DbId,
    pub vehicle_id: DbId,
    pub driver_id: DbId,
    pub origin: String,
    pub destination: String,
    pub cargo_weight: f64,
    pub status: TripStatus,
    pub odometer_start: f64,
    pub odometer_end: Option<f64>,
    pub created_at: Timestamp,
    pub dispatched_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceLog {
    pub id: DbId,
    pub vehicle_id: DbId,
    pub service_type: String,
    pub cost: f64,
    pub notes: Option<String>,
    pub status: MaintenanceStatus,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// License categories
// ---------------------------------------------------------------------------

/// Whether a comma-separated category list covers `vehicle_type`.
///
/// Entries are trimmed; matching is exact and case-sensitive.
pub fn license_covers(categories: &str, vehicle_type: VehicleType) -> bool {
    categories
        .split(',')
        .map(str::trim)
        .any(|c| c == vehicle_type.as_str())
}

/// Parse and validate a category list supplied at driver registration.
///
/// Rejects empty lists and unknown vehicle types.
pub fn parse_license_categories(raw: &str) -> Result<Vec<VehicleType>, CoreError> {
    let mut categories = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let vehicle_type: VehicleType = entry.parse()?;
        if !categories.contains(&vehicle_type) {
            categories.push(vehicle_type);
        }
    }
    if categories.is_empty() {
        return Err(CoreError::Validation(
            "License category must list at least one vehicle type".into(),
        ));
    }
    Ok(categories)
}

// ---------------------------------------------------------------------------
// Manual status changes
// ---------------------------------------------------------------------------

/// Validate an operator-requested vehicle status change.
///
/// `On Trip` belongs to the trip lifecycle: it can neither be set nor left
/// through this path.
pub fn validate_manual_vehicle_status(
    current: VehicleStatus,
    target: VehicleStatus,
) -> Result<(), CoreError> {
    if target == VehicleStatus::OnTrip {
        return Err(CoreError::InvalidState(
            "Vehicles are put On Trip only by dispatching a trip".into(),
        ));
    }
    if current == VehicleStatus::OnTrip {
        return Err(CoreError::InvalidState(
            "Vehicle is On Trip; complete or cancel the trip first".into(),
        ));
    }
    Ok(())
}

/// Validate an operator-requested driver status change.
///
/// `On Duty` belongs to the trip lifecycle, mirroring
/// [`validate_manual_vehicle_status`].
pub fn validate_manual_driver_status(
    current: DriverStatus,
    target: DriverStatus,
) -> Result<(), CoreError> {
    if target == DriverStatus::OnDuty {
        return Err(CoreError::InvalidState(
            "Drivers go On Duty only by dispatching a trip".into(),
        ));
    }
    if current == DriverStatus::OnDuty {
        return Err(CoreError::InvalidState(
            "Driver is On Duty; complete or cancel the trip first".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

/// A vehicle can be sent to the shop unless it is on the road or retired.
/// Vehicles already In Shop may take further open logs.
pub fn check_vehicle_serviceable(vehicle: &Vehicle) -> Result<(), CoreError> {
    match vehicle.status {
        VehicleStatus::OnTrip => Err(CoreError::InvalidState(
            "Cannot service a vehicle that is On Trip".into(),
        )),
        VehicleStatus::Retired => Err(CoreError::InvalidState(format!(
            "Vehicle is currently \"{}\"",
            vehicle.status
        ))),
        VehicleStatus::Available | VehicleStatus::InShop => Ok(()),
    }
}

/// A vehicle with In Progress logs stays in the shop until they are closed.
pub fn check_release_from_shop(target: VehicleStatus, open_logs: i64) -> Result<(), CoreError> {
    if target == VehicleStatus::Available && open_logs > 0 {
        return Err(CoreError::InvalidState(format!(
            "Vehicle has {open_logs} open maintenance log(s)"
        )));
    }
    Ok(())
}

/// Only In Progress logs can be closed.
pub fn check_maintenance_open(log: &MaintenanceLog) -> Result<(), CoreError> {
    if log.status == MaintenanceStatus::Completed {
        return Err(CoreError::InvalidState("Maintenance already completed".into()));
    }
    Ok(())
}
