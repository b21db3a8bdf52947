//! In-process [`TripStore`] backed by a single async mutex.
//!
//! A unit of work holds the mutex for its whole lifetime and edits a private
//! copy of the fleet; commit swaps the copy in. Units therefore serialize and
//! a dropped unit leaves no trace.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::CoreError;
use crate::fleet::{Driver, DriverStatus, Trip, TripStatus, Vehicle, VehicleStatus};
use crate::trip_lifecycle::rules::fleet_consistency_violations;
use crate::trip_lifecycle::store::{
    DriverCounter, NewTrip, TripStatusUpdate, TripStore, TripUnitOfWork,
};
use crate::types::DbId;

/// Every record held by a [`MemoryTripStore`].
#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub vehicles: BTreeMap<DbId, Vehicle>,
    pub drivers: BTreeMap<DbId, Driver>,
    pub trips: BTreeMap<DbId, Trip>,
}

impl FleetSnapshot {
    /// See [`fleet_consistency_violations`].
    pub fn consistency_violations(&self) -> Vec<String> {
        fleet_consistency_violations(
            self.vehicles.values(),
            self.drivers.values(),
            self.trips.values(),
        )
    }

    fn vehicle_mut(&mut self, id: DbId) -> Result<&mut Vehicle, CoreError> {
        self.vehicles
            .get_mut(&id)
            .ok_or(CoreError::not_found("Vehicle", id))
    }

    fn driver_mut(&mut self, id: DbId) -> Result<&mut Driver, CoreError> {
        self.drivers
            .get_mut(&id)
            .ok_or(CoreError::not_found("Driver", id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTripStore {
    inner: Arc<Mutex<FleetSnapshot>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vehicle, replacing any with the same id.
    pub async fn put_vehicle(&self, vehicle: Vehicle) {
        self.inner.lock().await.vehicles.insert(vehicle.id, vehicle);
    }

    /// Register a driver, replacing any with the same id.
    pub async fn put_driver(&self, driver: Driver) {
        self.inner.lock().await.drivers.insert(driver.id, driver);
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> FleetSnapshot {
        self.inner.lock().await.clone()
    }
}

impl TripStore for MemoryTripStore {
    type Unit = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, CoreError> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryUnitOfWork { guard, working })
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<FleetSnapshot>,
    working: FleetSnapshot,
}

impl TripUnitOfWork for MemoryUnitOfWork {
    async fn trip(&mut self, id: DbId) -> Result<Option<Trip>, CoreError> {
        Ok(self.working.trips.get(&id).cloned())
    }

    async fn vehicle(&mut self, id: DbId) -> Result<Option<Vehicle>, CoreError> {
        Ok(self.working.vehicles.get(&id).cloned())
    }

    async fn driver(&mut self, id: DbId) -> Result<Option<Driver>, CoreError> {
        Ok(self.working.drivers.get(&id).cloned())
    }

    async fn insert_trip(&mut self, trip: &NewTrip) -> Result<Trip, CoreError> {
        if !self.working.vehicles.contains_key(&trip.vehicle_id) {
            return Err(CoreError::not_found("Vehicle", trip.vehicle_id));
        }
        if !self.working.drivers.contains_key(&trip.driver_id) {
            return Err(CoreError::not_found("Driver", trip.driver_id));
        }
        let id = self.working.trips.keys().next_back().map_or(1, |last| last + 1);
        let record = Trip {
            id,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            origin: trip.origin.clone(),
            destination: trip.destination.clone(),
            cargo_weight: trip.cargo_weight,
            status: TripStatus::Draft,
            odometer_start: trip.odometer_start,
            odometer_end: None,
            created_at: trip.created_at,
            dispatched_at: None,
            completed_at: None,
        };
        self.working.trips.insert(id, record.clone());
        Ok(record)
    }

    async fn update_vehicle_status(
        &mut self,
        id: DbId,
        status: VehicleStatus,
    ) -> Result<(), CoreError> {
        self.working.vehicle_mut(id)?.status = status;
        Ok(())
    }

    async fn update_vehicle_odometer(&mut self, id: DbId, odometer: f64) -> Result<(), CoreError> {
        self.working.vehicle_mut(id)?.odometer = odometer;
        Ok(())
    }

    async fn update_driver_status(
        &mut self,
        id: DbId,
        status: DriverStatus,
    ) -> Result<(), CoreError> {
        self.working.driver_mut(id)?.status = status;
        Ok(())
    }

    async fn increment_driver_counter(
        &mut self,
        id: DbId,
        counter: DriverCounter,
    ) -> Result<(), CoreError> {
        let driver = self.working.driver_mut(id)?;
        match counter {
            DriverCounter::TripsCompleted => driver.trips_completed += 1,
            DriverCounter::TripsCancelled => driver.trips_cancelled += 1,
        }
        Ok(())
    }

    async fn update_trip_status(
        &mut self,
        id: DbId,
        update: &TripStatusUpdate,
    ) -> Result<Trip, CoreError> {
        let trip = self
            .working
            .trips
            .get_mut(&id)
            .ok_or(CoreError::not_found("Trip", id))?;
        trip.status = update.status;
        if let Some(at) = update.dispatched_at {
            trip.dispatched_at = Some(at);
        }
        if let Some(at) = update.completed_at {
            trip.completed_at = Some(at);
        }
        if let Some(end) = update.odometer_end {
            trip.odometer_end = Some(end);
        }
        Ok(trip.clone())
    }

    async fn commit(self) -> Result<(), CoreError> {
        let MemoryUnitOfWork { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}
