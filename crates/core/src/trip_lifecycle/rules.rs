//! Eligibility checks and cross-entity consistency rules.
//!
//! Each check returns the exact reason shown to dispatchers. Trip creation
//! runs them in a fixed order and the first failure wins.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::fleet::{
    license_covers, Driver, DriverStatus, Trip, TripStatus, Vehicle, VehicleStatus,
};
use crate::types::{Date, DbId};

/// Vehicle must be Available to take a trip.
pub fn check_vehicle_available(vehicle: &Vehicle) -> Result<(), CoreError> {
    if vehicle.status != VehicleStatus::Available {
        return Err(CoreError::Eligibility(format!(
            "Vehicle is currently \"{}\"",
            vehicle.status
        )));
    }
    Ok(())
}

/// Driver must be Off Duty to take a trip.
pub fn check_driver_available(driver: &Driver) -> Result<(), CoreError> {
    if driver.status != DriverStatus::OffDuty {
        return Err(CoreError::Eligibility(format!(
            "Driver is currently \"{}\"",
            driver.status
        )));
    }
    Ok(())
}

/// A license expiring today is still valid today.
pub fn check_license_valid(driver: &Driver, today: Date) -> Result<(), CoreError> {
    if driver.license_expiry < today {
        return Err(CoreError::Eligibility("Driver license has expired".into()));
    }
    Ok(())
}

pub fn check_license_covers(driver: &Driver, vehicle: &Vehicle) -> Result<(), CoreError> {
    if !license_covers(&driver.license_category, vehicle.vehicle_type) {
        return Err(CoreError::Eligibility(format!(
            "Driver not licensed for {} (has: {})",
            vehicle.vehicle_type, driver.license_category
        )));
    }
    Ok(())
}

/// Cargo equal to capacity is allowed.
pub fn check_cargo_capacity(cargo_weight: f64, vehicle: &Vehicle) -> Result<(), CoreError> {
    if cargo_weight > vehicle.max_capacity {
        return Err(CoreError::Eligibility(format!(
            "Cargo {cargo_weight}kg exceeds vehicle max capacity {}kg",
            vehicle.max_capacity
        )));
    }
    Ok(())
}

/// Closing readings for a completed trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometerClose {
    /// Recorded on the trip as `odometer_end`.
    pub trip_end: f64,
    /// Written back to the vehicle.
    pub vehicle_odometer: f64,
}

/// Resolve the closing odometer reading for a completed trip.
///
/// A missing or zero reading means the vehicle did not move: the trip closes
/// at `odometer_start` and the vehicle keeps its current reading. A supplied
/// reading must not be below the trip start nor below the vehicle's current
/// odometer, which later trips on the same vehicle may have advanced.
pub fn resolve_odometer_end(
    trip: &Trip,
    vehicle: &Vehicle,
    supplied: Option<f64>,
) -> Result<OdometerClose, CoreError> {
    let Some(end) = supplied.filter(|value| *value != 0.0) else {
        return Ok(OdometerClose {
            trip_end: trip.odometer_start,
            vehicle_odometer: vehicle.odometer.max(trip.odometer_start),
        });
    };
    if !end.is_finite() {
        return Err(CoreError::Validation(
            "Odometer end must be a finite number".into(),
        ));
    }
    if end < trip.odometer_start {
        return Err(CoreError::Validation(format!(
            "Odometer end {end}km is below trip start {}km",
            trip.odometer_start
        )));
    }
    if end < vehicle.odometer {
        return Err(CoreError::Validation(format!(
            "Odometer end {end}km is below vehicle odometer {}km",
            vehicle.odometer
        )));
    }
    Ok(OdometerClose {
        trip_end: end,
        vehicle_odometer: end,
    })
}

/// Check the vehicle/driver/trip status coupling across a whole fleet.
///
/// A vehicle is On Trip, and a driver On Duty, exactly when one Dispatched
/// trip references them. Returns an empty `Vec` when consistent; otherwise a
/// list of human-readable violations.
pub fn fleet_consistency_violations<'a>(
    vehicles: impl IntoIterator<Item = &'a Vehicle>,
    drivers: impl IntoIterator<Item = &'a Driver>,
    trips: impl IntoIterator<Item = &'a Trip>,
) -> Vec<String> {
    let mut dispatched_by_vehicle: HashMap<DbId, usize> = HashMap::new();
    let mut dispatched_by_driver: HashMap<DbId, usize> = HashMap::new();
    for trip in trips {
        if trip.status == TripStatus::Dispatched {
            *dispatched_by_vehicle.entry(trip.vehicle_id).or_default() += 1;
            *dispatched_by_driver.entry(trip.driver_id).or_default() += 1;
        }
    }

    let mut violations = Vec::new();

    for vehicle in vehicles {
        let active = dispatched_by_vehicle.get(&vehicle.id).copied().unwrap_or(0);
        let on_trip = vehicle.status == VehicleStatus::OnTrip;
        if on_trip != (active == 1) || active > 1 {
            violations.push(format!(
                "Vehicle {} is \"{}\" with {active} dispatched trip(s)",
                vehicle.id, vehicle.status
            ));
        }
    }

    for driver in drivers {
        let active = dispatched_by_driver.get(&driver.id).copied().unwrap_or(0);
        let on_duty = driver.status == DriverStatus::OnDuty;
        if on_duty != (active == 1) || active > 1 {
            violations.push(format!(
                "Driver {} is \"{}\" with {active} dispatched trip(s)",
                driver.id, driver.status
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::VehicleType;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn vehicle() -> Vehicle {
        Vehicle {
            id: 1,
            name: "Truck-01".into(),
            model: "Tata Ace".into(),
            plate: "MH-12-AB-1234".into(),
            vehicle_type: VehicleType::Truck,
            max_capacity: 2000.0,
            odometer: 45200.0,
            status: VehicleStatus::Available,
            region: "North".into(),
            acquisition_cost: 1_200_000.0,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn driver() -> Driver {
        Driver {
            id: 1,
            name: "Alex Johnson".into(),
            license_number: "DL-2024-001".into(),
            license_category: "Truck,Van".into(),
            license_expiry: NaiveDate::from_ymd_opt(2027, 6, 15).unwrap(),
            safety_score: 92.0,
            status: DriverStatus::OffDuty,
            trips_completed: 0,
            trips_cancelled: 0,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn trip(status: TripStatus) -> Trip {
        Trip {
            id: 1,
            vehicle_id: 1,
            driver_id: 1,
            origin: "A".into(),
            destination: "B".into(),
            cargo_weight: 100.0,
            status,
            odometer_start: 45200.0,
            odometer_end: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            dispatched_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn unavailable_vehicle_reports_quoted_status() {
        let mut v = vehicle();
        v.status = VehicleStatus::InShop;
        let err = check_vehicle_available(&v).unwrap_err();
        assert_eq!(err.to_string(), "Vehicle is currently \"In Shop\"");
    }

    #[test]
    fn suspended_driver_is_ineligible() {
        let mut d = driver();
        d.status = DriverStatus::Suspended;
        let err = check_driver_available(&d).unwrap_err();
        assert_eq!(err.to_string(), "Driver is currently \"Suspended\"");
    }

    #[test]
    fn license_expiring_today_is_valid() {
        let d = driver();
        assert!(check_license_valid(&d, d.license_expiry).is_ok());
        let next_day = d.license_expiry.succ_opt().unwrap();
        assert_matches!(check_license_valid(&d, next_day), Err(CoreError::Eligibility(_)));
    }

    #[test]
    fn category_mismatch_lists_held_categories() {
        let mut v = vehicle();
        v.vehicle_type = VehicleType::Bike;
        let err = check_license_covers(&driver(), &v).unwrap_err();
        assert_eq!(err.to_string(), "Driver not licensed for Bike (has: Truck,Van)");
    }

    #[test]
    fn cargo_at_capacity_is_allowed() {
        let v = vehicle();
        assert!(check_cargo_capacity(2000.0, &v).is_ok());
        let err = check_cargo_capacity(2500.0, &v).unwrap_err();
        assert_eq!(err.to_string(), "Cargo 2500kg exceeds vehicle max capacity 2000kg");
    }

    #[test]
    fn odometer_end_falls_back_to_start() {
        let t = trip(TripStatus::Dispatched);
        let v = vehicle();
        let close = resolve_odometer_end(&t, &v, None).unwrap();
        assert_eq!(close, OdometerClose { trip_end: 45200.0, vehicle_odometer: 45200.0 });
        assert_eq!(resolve_odometer_end(&t, &v, Some(0.0)).unwrap(), close);
        let close = resolve_odometer_end(&t, &v, Some(45400.0)).unwrap();
        assert_eq!(close, OdometerClose { trip_end: 45400.0, vehicle_odometer: 45400.0 });
    }

    #[test]
    fn odometer_end_below_start_is_rejected() {
        let t = trip(TripStatus::Dispatched);
        let err = resolve_odometer_end(&t, &vehicle(), Some(45100.0)).unwrap_err();
        assert_eq!(err.to_string(), "Odometer end 45100km is below trip start 45200km");
        assert_matches!(
            resolve_odometer_end(&t, &vehicle(), Some(f64::NAN)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn fallback_never_lowers_an_advanced_vehicle_odometer() {
        let t = trip(TripStatus::Dispatched);
        let mut v = vehicle();
        v.odometer = 46000.0;
        let close = resolve_odometer_end(&t, &v, None).unwrap();
        assert_eq!(close, OdometerClose { trip_end: 45200.0, vehicle_odometer: 46000.0 });
    }

    #[test]
    fn odometer_end_below_vehicle_reading_is_rejected() {
        let t = trip(TripStatus::Dispatched);
        let mut v = vehicle();
        v.odometer = 46000.0;
        let err = resolve_odometer_end(&t, &v, Some(45500.0)).unwrap_err();
        assert_eq!(err.to_string(), "Odometer end 45500km is below vehicle odometer 46000km");
        assert!(resolve_odometer_end(&t, &v, Some(46000.0)).is_ok());
    }

    #[test]
    fn consistent_fleet_has_no_violations() {
        let mut v = vehicle();
        let mut d = driver();
        v.status = VehicleStatus::OnTrip;
        d.status = DriverStatus::OnDuty;
        let trips = [trip(TripStatus::Dispatched), trip(TripStatus::Completed)];
        assert!(fleet_consistency_violations([&v], [&d], &trips).is_empty());
    }

    #[test]
    fn on_trip_vehicle_without_dispatched_trip_is_flagged() {
        let mut v = vehicle();
        v.status = VehicleStatus::OnTrip;
        let trips = [trip(TripStatus::Draft)];
        let violations = fleet_consistency_violations([&v], [&driver()], &trips);
        assert_eq!(violations, vec!["Vehicle 1 is \"On Trip\" with 0 dispatched trip(s)"]);
    }

    #[test]
    fn two_dispatched_trips_for_one_driver_are_flagged() {
        let mut d = driver();
        d.status = DriverStatus::OnDuty;
        let mut second = trip(TripStatus::Dispatched);
        second.id = 2;
        second.vehicle_id = 2;
        let trips = [trip(TripStatus::Dispatched), second];
        let violations = fleet_consistency_violations(std::iter::empty(), [&d], &trips);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("Driver 1"));
    }
}
