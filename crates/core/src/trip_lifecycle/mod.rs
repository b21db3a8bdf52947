//! Trip lifecycle state machine.
//!
//! ```text
//! (create) -> Draft -> Dispatched -> Completed
//!               |          |
//!               +----------+-------> Cancelled
//! ```
//!
//! [`TripLifecycle`] owns the transition table and applies each transition
//! as one unit of work against an injected [`TripStore`]: the trip, its
//! vehicle and its driver change together or not at all. Validation always
//! completes before the first write.

pub mod memory;
pub mod rules;
pub mod store;

use std::sync::Arc;

use serde::Deserialize;

use crate::error::CoreError;
use crate::fleet::{DriverStatus, Trip, TripStatus, VehicleStatus};
use crate::types::{DbId, Timestamp};

pub use store::{DriverCounter, NewTrip, TripStatusUpdate, TripStore, TripUnitOfWork};

/// Request to plan a new trip. Every field is required; they are optional
/// here so a missing one is reported as a validation failure rather than a
/// deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTrip {
    pub vehicle_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub cargo_weight: Option<f64>,
}

/// A [`CreateTrip`] with all required fields present.
#[derive(Debug, Clone, PartialEq)]
struct TripRequest {
    vehicle_id: DbId,
    driver_id: DbId,
    origin: String,
    destination: String,
    cargo_weight: f64,
}

impl CreateTrip {
    fn require_fields(&self) -> Result<TripRequest, CoreError> {
        let missing = || CoreError::Validation("Missing required fields".into());
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let vehicle_id = self.vehicle_id.ok_or_else(missing)?;
        let driver_id = self.driver_id.ok_or_else(missing)?;
        let origin = text(&self.origin).ok_or_else(missing)?;
        let destination = text(&self.destination).ok_or_else(missing)?;
        let cargo_weight = self.cargo_weight.ok_or_else(missing)?;

        if !cargo_weight.is_finite() || cargo_weight <= 0.0 {
            return Err(CoreError::Validation(
                "Cargo weight must be a positive number".into(),
            ));
        }

        Ok(TripRequest {
            vehicle_id,
            driver_id,
            origin,
            destination,
            cargo_weight,
        })
    }
}

type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// The trip state machine bound to a store.
pub struct TripLifecycle<S> {
    store: S,
    clock: Clock,
}

impl<S: TripStore> TripLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Arc::new(chrono::Utc::now),
        }
    }

    /// Replace the wall clock, e.g. to pin "today" for license checks.
    pub fn with_clock(mut self, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Plan a Draft trip after checking eligibility.
    ///
    /// Checks run in this order and the first failure is returned: required
    /// fields, vehicle exists, vehicle Available, driver exists, driver Off
    /// Duty, license not expired, license covers the vehicle type, cargo
    /// within capacity. Nothing is reserved; vehicle and driver are untouched.
    pub async fn create_trip(&self, input: &CreateTrip) -> Result<Trip, CoreError> {
        let request = input.require_fields()?;
        let now = (self.clock)();
        let mut unit = self.store.begin().await?;

        let vehicle = unit
            .vehicle(request.vehicle_id)
            .await?
            .ok_or(CoreError::not_found("Vehicle", request.vehicle_id))?;
        rules::check_vehicle_available(&vehicle)?;

        let driver = unit
            .driver(request.driver_id)
            .await?
            .ok_or(CoreError::not_found("Driver", request.driver_id))?;
        rules::check_driver_available(&driver)?;
        rules::check_license_valid(&driver, now.date_naive())?;
        rules::check_license_covers(&driver, &vehicle)?;
        rules::check_cargo_capacity(request.cargo_weight, &vehicle)?;

        let trip = unit
            .insert_trip(&NewTrip {
                vehicle_id: vehicle.id,
                driver_id: driver.id,
                origin: request.origin,
                destination: request.destination,
                cargo_weight: request.cargo_weight,
                odometer_start: vehicle.odometer,
                created_at: now,
            })
            .await?;
        unit.commit().await?;
        Ok(trip)
    }

    /// Draft -> Dispatched. Commits the vehicle (On Trip) and driver (On Duty).
    ///
    /// Drafts reserve nothing, so the vehicle and driver are re-checked here:
    /// another trip may have claimed them since this one was planned, and the
    /// license may have lapsed in the meantime.
    pub async fn dispatch_trip(&self, trip_id: DbId) -> Result<Trip, CoreError> {
        let now = (self.clock)();
        let mut unit = self.store.begin().await?;

        let trip = unit
            .trip(trip_id)
            .await?
            .ok_or(CoreError::not_found("Trip", trip_id))?;
        if trip.status != TripStatus::Draft {
            return Err(CoreError::InvalidState(
                "Only Draft trips can be dispatched".into(),
            ));
        }

        let vehicle = unit
            .vehicle(trip.vehicle_id)
            .await?
            .ok_or(CoreError::not_found("Vehicle", trip.vehicle_id))?;
        rules::check_vehicle_available(&vehicle)?;
        let driver = unit
            .driver(trip.driver_id)
            .await?
            .ok_or(CoreError::not_found("Driver", trip.driver_id))?;
        rules::check_driver_available(&driver)?;
        rules::check_license_valid(&driver, now.date_naive())?;
        rules::check_license_covers(&driver, &vehicle)?;

        let updated = unit
            .update_trip_status(
                trip_id,
                &TripStatusUpdate {
                    dispatched_at: Some(now),
                    ..TripStatusUpdate::status(TripStatus::Dispatched)
                },
            )
            .await?;
        unit.update_vehicle_status(vehicle.id, VehicleStatus::OnTrip).await?;
        unit.update_driver_status(driver.id, DriverStatus::OnDuty).await?;
        unit.commit().await?;
        Ok(updated)
    }

    /// Dispatched -> Completed. Releases the vehicle and driver, advances the
    /// vehicle odometer to the closing reading, and credits the driver.
    ///
    /// A missing or zero `odometer_end` means the vehicle did not move. The
    /// vehicle odometer never goes backwards, even when another trip on the
    /// same vehicle closed after this one was planned.
    pub async fn complete_trip(
        &self,
        trip_id: DbId,
        odometer_end: Option<f64>,
    ) -> Result<Trip, CoreError> {
        let now = (self.clock)();
        let mut unit = self.store.begin().await?;

        let trip = unit
            .trip(trip_id)
            .await?
            .ok_or(CoreError::not_found("Trip", trip_id))?;
        if trip.status != TripStatus::Dispatched {
            return Err(CoreError::InvalidState(
                "Only Dispatched trips can be completed".into(),
            ));
        }

        // Lock order: trip, vehicle, driver.
        let vehicle = unit
            .vehicle(trip.vehicle_id)
            .await?
            .ok_or(CoreError::not_found("Vehicle", trip.vehicle_id))?;
        let close = rules::resolve_odometer_end(&trip, &vehicle, odometer_end)?;
        unit.driver(trip.driver_id)
            .await?
            .ok_or(CoreError::not_found("Driver", trip.driver_id))?;

        let updated = unit
            .update_trip_status(
                trip_id,
                &TripStatusUpdate {
                    completed_at: Some(now),
                    odometer_end: Some(close.trip_end),
                    ..TripStatusUpdate::status(TripStatus::Completed)
                },
            )
            .await?;
        unit.update_vehicle_status(trip.vehicle_id, VehicleStatus::Available).await?;
        unit.update_vehicle_odometer(vehicle.id, close.vehicle_odometer).await?;
        unit.update_driver_status(trip.driver_id, DriverStatus::OffDuty).await?;
        unit.increment_driver_counter(trip.driver_id, DriverCounter::TripsCompleted).await?;
        unit.commit().await?;
        Ok(updated)
    }

    /// Draft or Dispatched -> Cancelled.
    ///
    /// Cancelling a Dispatched trip releases its vehicle and driver and counts
    /// against the driver; cancelling a Draft touches only the trip.
    pub async fn cancel_trip(&self, trip_id: DbId) -> Result<Trip, CoreError> {
        let mut unit = self.store.begin().await?;

        let trip = unit
            .trip(trip_id)
            .await?
            .ok_or(CoreError::not_found("Trip", trip_id))?;
        if trip.status.is_terminal() {
            return Err(CoreError::InvalidState("Trip already finalized".into()));
        }

        let was_dispatched = trip.status == TripStatus::Dispatched;
        if was_dispatched {
            unit.vehicle(trip.vehicle_id)
                .await?
                .ok_or(CoreError::not_found("Vehicle", trip.vehicle_id))?;
            unit.driver(trip.driver_id)
                .await?
                .ok_or(CoreError::not_found("Driver", trip.driver_id))?;
        }

        let updated = unit
            .update_trip_status(trip_id, &TripStatusUpdate::status(TripStatus::Cancelled))
            .await?;
        if was_dispatched {
            unit.update_vehicle_status(trip.vehicle_id, VehicleStatus::Available).await?;
            unit.update_driver_status(trip.driver_id, DriverStatus::OffDuty).await?;
            unit.increment_driver_counter(trip.driver_id, DriverCounter::TripsCancelled).await?;
        }
        unit.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryTripStore;
    use super::*;
    use crate::fleet::{Driver, Vehicle, VehicleType};
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    fn today() -> NaiveDate {
        fixed_now().date_naive()
    }

    fn truck(id: DbId) -> Vehicle {
        Vehicle {
            id,
            name: format!("Truck-{id:02}"),
            model: "Tata Ace".into(),
            plate: format!("MH-12-AB-{id:04}"),
            vehicle_type: VehicleType::Truck,
            max_capacity: 2000.0,
            odometer: 45200.0,
            status: VehicleStatus::Available,
            region: "North".into(),
            acquisition_cost: 1_200_000.0,
            created_at: fixed_now(),
        }
    }

    fn truck_driver(id: DbId) -> Driver {
        Driver {
            id,
            name: format!("Driver {id}"),
            license_number: format!("DL-2024-{id:03}"),
            license_category: "Truck".into(),
            license_expiry: NaiveDate::from_ymd_opt(2027, 9, 30).unwrap(),
            safety_score: 90.0,
            status: DriverStatus::OffDuty,
            trips_completed: 51,
            trips_cancelled: 3,
            created_at: fixed_now(),
        }
    }

    fn request(vehicle_id: DbId, driver_id: DbId, cargo_weight: f64) -> CreateTrip {
        CreateTrip {
            vehicle_id: Some(vehicle_id),
            driver_id: Some(driver_id),
            origin: Some("A".into()),
            destination: Some("B".into()),
            cargo_weight: Some(cargo_weight),
        }
    }

    async fn fleet() -> TripLifecycle<MemoryTripStore> {
        let store = MemoryTripStore::new();
        store.put_vehicle(truck(1)).await;
        store.put_driver(truck_driver(1)).await;
        TripLifecycle::new(store).with_clock(fixed_now)
    }

    async fn assert_consistent(lifecycle: &TripLifecycle<MemoryTripStore>) {
        let violations = lifecycle.store().snapshot().await.consistency_violations();
        assert!(violations.is_empty(), "inconsistent fleet: {violations:?}");
    }

    // -- create -------------------------------------------------------------

    #[tokio::test]
    async fn create_seeds_draft_from_vehicle_odometer() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();

        assert_eq!(trip.status, TripStatus::Draft);
        assert_eq!(trip.odometer_start, 45200.0);
        assert_eq!(trip.created_at, fixed_now());
        assert_eq!(trip.odometer_end, None);

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.vehicles[&1].status, VehicleStatus::Available);
        assert_eq!(snapshot.drivers[&1].status, DriverStatus::OffDuty);
    }

    #[tokio::test]
    async fn create_over_capacity_mutates_nothing() {
        let lifecycle = fleet().await;
        let before = lifecycle.store().snapshot().await;

        let err = lifecycle.create_trip(&request(1, 1, 2500.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Eligibility(ref msg)
            if msg == "Cargo 2500kg exceeds vehicle max capacity 2000kg");

        let after = lifecycle.store().snapshot().await;
        assert!(after.trips.is_empty());
        assert_eq!(after.vehicles, before.vehicles);
        assert_eq!(after.drivers, before.drivers);
    }

    #[tokio::test]
    async fn create_at_exact_capacity_succeeds() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 2000.0)).await.unwrap();
        assert_eq!(trip.status, TripStatus::Draft);
    }

    #[tokio::test]
    async fn create_with_license_expiring_today_succeeds() {
        let lifecycle = fleet().await;
        let mut driver = truck_driver(1);
        driver.license_expiry = today();
        lifecycle.store().put_driver(driver).await;

        assert!(lifecycle.create_trip(&request(1, 1, 100.0)).await.is_ok());
    }

    #[tokio::test]
    async fn create_with_license_expired_yesterday_fails() {
        let lifecycle = fleet().await;
        let mut driver = truck_driver(1);
        driver.license_expiry = today().pred_opt().unwrap();
        lifecycle.store().put_driver(driver).await;

        let err = lifecycle.create_trip(&request(1, 1, 100.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Eligibility(ref msg) if msg == "Driver license has expired");
    }

    #[tokio::test]
    async fn create_reports_missing_fields_first() {
        let lifecycle = fleet().await;
        let mut input = request(99, 99, 100.0);
        input.destination = Some("   ".into());

        let err = lifecycle.create_trip(&input).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg == "Missing required fields");

        let err = lifecycle.create_trip(&CreateTrip::default()).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[tokio::test]
    async fn create_rejects_non_positive_cargo() {
        let lifecycle = fleet().await;
        let err = lifecycle.create_trip(&request(1, 1, 0.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[tokio::test]
    async fn create_checks_vehicle_before_driver() {
        let lifecycle = fleet().await;
        let mut vehicle = truck(1);
        vehicle.status = VehicleStatus::InShop;
        lifecycle.store().put_vehicle(vehicle).await;

        // Driver 42 does not exist, but the vehicle failure wins.
        let err = lifecycle.create_trip(&request(1, 42, 100.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Eligibility(ref msg) if msg == "Vehicle is currently \"In Shop\"");

        let err = lifecycle.create_trip(&request(7, 42, 100.0)).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Vehicle", id: 7 });
    }

    #[tokio::test]
    async fn create_checks_driver_status_before_license() {
        let lifecycle = fleet().await;
        let mut driver = truck_driver(1);
        driver.status = DriverStatus::Suspended;
        driver.license_expiry = today().pred_opt().unwrap();
        driver.license_category = "Bike".into();
        lifecycle.store().put_driver(driver).await;

        let err = lifecycle.create_trip(&request(1, 1, 100.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Eligibility(ref msg) if msg == "Driver is currently \"Suspended\"");

        let err = lifecycle.create_trip(&request(1, 2, 100.0)).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Driver", id: 2 });
    }

    #[tokio::test]
    async fn create_checks_category_before_capacity() {
        let lifecycle = fleet().await;
        let mut driver = truck_driver(1);
        driver.license_category = "Van,Bike".into();
        lifecycle.store().put_driver(driver).await;

        let err = lifecycle.create_trip(&request(1, 1, 9000.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Eligibility(ref msg)
            if msg == "Driver not licensed for Truck (has: Van,Bike)");
    }

    // -- dispatch -----------------------------------------------------------

    #[tokio::test]
    async fn dispatch_commits_vehicle_and_driver() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();

        let dispatched = lifecycle.dispatch_trip(trip.id).await.unwrap();
        assert_eq!(dispatched.status, TripStatus::Dispatched);
        assert_eq!(dispatched.dispatched_at, Some(fixed_now()));

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.vehicles[&1].status, VehicleStatus::OnTrip);
        assert_eq!(snapshot.drivers[&1].status, DriverStatus::OnDuty);
        assert_consistent(&lifecycle).await;
    }

    #[tokio::test]
    async fn dispatch_twice_is_invalid_and_changes_nothing() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();
        lifecycle.dispatch_trip(trip.id).await.unwrap();
        let before = lifecycle.store().snapshot().await;

        let err = lifecycle.dispatch_trip(trip.id).await.unwrap_err();
        assert_matches!(err, CoreError::InvalidState(ref msg) if msg == "Only Draft trips can be dispatched");

        let after = lifecycle.store().snapshot().await;
        assert_eq!(after.trips, before.trips);
        assert_eq!(after.vehicles, before.vehicles);
        assert_eq!(after.drivers, before.drivers);
    }

    #[tokio::test]
    async fn second_draft_for_same_vehicle_cannot_dispatch() {
        let lifecycle = fleet().await;
        lifecycle.store().put_driver(truck_driver(2)).await;
        let first = lifecycle.create_trip(&request(1, 1, 100.0)).await.unwrap();
        let second = lifecycle.create_trip(&request(1, 2, 100.0)).await.unwrap();

        lifecycle.dispatch_trip(first.id).await.unwrap();
        let err = lifecycle.dispatch_trip(second.id).await.unwrap_err();
        assert_matches!(err, CoreError::Eligibility(ref msg) if msg == "Vehicle is currently \"On Trip\"");

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.trips[&second.id].status, TripStatus::Draft);
        assert_eq!(snapshot.drivers[&2].status, DriverStatus::OffDuty);
        assert_consistent(&lifecycle).await;
    }

    #[tokio::test]
    async fn dispatch_after_license_lapses_is_refused() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 100.0)).await.unwrap();
        let mut driver = truck_driver(1);
        driver.license_expiry = today().pred_opt().unwrap();
        lifecycle.store().put_driver(driver).await;

        let err = lifecycle.dispatch_trip(trip.id).await.unwrap_err();
        assert_matches!(err, CoreError::Eligibility(ref msg) if msg == "Driver license has expired");

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.trips[&trip.id].status, TripStatus::Draft);
        assert_eq!(snapshot.vehicles[&1].status, VehicleStatus::Available);
        assert_eq!(snapshot.drivers[&1].status, DriverStatus::OffDuty);
    }

    #[tokio::test]
    async fn dispatch_unknown_trip_is_not_found() {
        let lifecycle = fleet().await;
        let err = lifecycle.dispatch_trip(404).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Trip", id: 404 });
    }

    // -- complete -----------------------------------------------------------

    #[tokio::test]
    async fn end_to_end_create_dispatch_complete() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();
        assert_eq!(trip.odometer_start, 45200.0);
        lifecycle.dispatch_trip(trip.id).await.unwrap();

        let completed = lifecycle.complete_trip(trip.id, Some(45400.0)).await.unwrap();
        assert_eq!(completed.status, TripStatus::Completed);
        assert_eq!(completed.odometer_end, Some(45400.0));
        assert_eq!(completed.completed_at, Some(fixed_now()));

        let snapshot = lifecycle.store().snapshot().await;
        let vehicle = &snapshot.vehicles[&1];
        assert_eq!(vehicle.status, VehicleStatus::Available);
        assert_eq!(vehicle.odometer, 45400.0);
        let driver = &snapshot.drivers[&1];
        assert_eq!(driver.status, DriverStatus::OffDuty);
        assert_eq!(driver.trips_completed, 52);
        assert_eq!(driver.trips_cancelled, 3);
        assert_consistent(&lifecycle).await;

        // The next trip starts where the last one ended.
        let next = lifecycle.create_trip(&request(1, 1, 10.0)).await.unwrap();
        assert_eq!(next.odometer_start, 45400.0);
    }

    #[tokio::test]
    async fn complete_without_reading_keeps_odometer() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();
        lifecycle.dispatch_trip(trip.id).await.unwrap();

        let completed = lifecycle.complete_trip(trip.id, None).await.unwrap();
        assert_eq!(completed.odometer_end, Some(completed.odometer_start));

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.vehicles[&1].odometer, 45200.0);
    }

    #[tokio::test]
    async fn complete_with_backwards_reading_is_rejected() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();
        lifecycle.dispatch_trip(trip.id).await.unwrap();

        let err = lifecycle.complete_trip(trip.id, Some(45000.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(_));

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.trips[&trip.id].status, TripStatus::Dispatched);
        assert_eq!(snapshot.vehicles[&1].status, VehicleStatus::OnTrip);
    }

    #[tokio::test]
    async fn stale_draft_completion_never_rewinds_odometer() {
        let lifecycle = fleet().await;
        lifecycle.store().put_driver(truck_driver(2)).await;
        let stale = lifecycle.create_trip(&request(1, 1, 100.0)).await.unwrap();
        let fresh = lifecycle.create_trip(&request(1, 2, 100.0)).await.unwrap();
        lifecycle.dispatch_trip(fresh.id).await.unwrap();
        lifecycle.complete_trip(fresh.id, Some(46000.0)).await.unwrap();

        lifecycle.dispatch_trip(stale.id).await.unwrap();
        let err = lifecycle.complete_trip(stale.id, Some(45500.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg)
            if msg == "Odometer end 45500km is below vehicle odometer 46000km");

        let completed = lifecycle.complete_trip(stale.id, None).await.unwrap();
        assert_eq!(completed.odometer_end, Some(45200.0));

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.vehicles[&1].odometer, 46000.0);
        assert_eq!(snapshot.vehicles[&1].status, VehicleStatus::Available);
        assert_consistent(&lifecycle).await;
    }

    #[tokio::test]
    async fn complete_draft_is_invalid() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();

        let err = lifecycle.complete_trip(trip.id, Some(45300.0)).await.unwrap_err();
        assert_matches!(err, CoreError::InvalidState(ref msg) if msg == "Only Dispatched trips can be completed");
    }

    // -- cancel -------------------------------------------------------------

    #[tokio::test]
    async fn cancel_dispatched_releases_assets() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();
        lifecycle.dispatch_trip(trip.id).await.unwrap();

        let cancelled = lifecycle.cancel_trip(trip.id).await.unwrap();
        assert_eq!(cancelled.status, TripStatus::Cancelled);

        let snapshot = lifecycle.store().snapshot().await;
        assert_eq!(snapshot.vehicles[&1].status, VehicleStatus::Available);
        let driver = &snapshot.drivers[&1];
        assert_eq!(driver.status, DriverStatus::OffDuty);
        assert_eq!(driver.trips_cancelled, 4);
        assert_eq!(driver.trips_completed, 51);
        assert_consistent(&lifecycle).await;
    }

    #[tokio::test]
    async fn cancel_draft_leaves_assets_untouched() {
        let lifecycle = fleet().await;
        // Put the vehicle in the shop after planning: cancelling the draft
        // must not flip it back to Available.
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();
        let mut vehicle = truck(1);
        vehicle.status = VehicleStatus::InShop;
        lifecycle.store().put_vehicle(vehicle).await;
        let before = lifecycle.store().snapshot().await;

        lifecycle.cancel_trip(trip.id).await.unwrap();

        let after = lifecycle.store().snapshot().await;
        assert_eq!(after.vehicles, before.vehicles);
        assert_eq!(after.drivers, before.drivers);
        assert_eq!(after.trips[&trip.id].status, TripStatus::Cancelled);
    }

    #[tokio::test]
    async fn terminal_trips_cannot_be_cancelled() {
        let lifecycle = fleet().await;
        let trip = lifecycle.create_trip(&request(1, 1, 1800.0)).await.unwrap();
        lifecycle.cancel_trip(trip.id).await.unwrap();

        let err = lifecycle.cancel_trip(trip.id).await.unwrap_err();
        assert_matches!(err, CoreError::InvalidState(ref msg) if msg == "Trip already finalized");

        let done = lifecycle.create_trip(&request(1, 1, 10.0)).await.unwrap();
        lifecycle.dispatch_trip(done.id).await.unwrap();
        lifecycle.complete_trip(done.id, None).await.unwrap();
        assert_matches!(
            lifecycle.cancel_trip(done.id).await,
            Err(CoreError::InvalidState(_))
        );
        assert_matches!(
            lifecycle.dispatch_trip(done.id).await,
            Err(CoreError::InvalidState(_))
        );
    }

    #[tokio::test]
    async fn concurrent_dispatches_of_competing_drafts_leave_one_winner() {
        let lifecycle = Arc::new(fleet().await);
        lifecycle.store().put_driver(truck_driver(2)).await;
        let a = lifecycle.create_trip(&request(1, 1, 100.0)).await.unwrap();
        let b = lifecycle.create_trip(&request(1, 2, 100.0)).await.unwrap();

        let (first, second) = tokio::join!(
            lifecycle.dispatch_trip(a.id),
            lifecycle.dispatch_trip(b.id)
        );
        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        assert_consistent(&lifecycle).await;
    }
}
