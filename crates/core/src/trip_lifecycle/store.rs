//! Storage contract the trip state machine depends on.
//!
//! A [`TripStore`] hands out [`TripUnitOfWork`] handles. Every read through a
//! handle locks the row it returns until the handle is committed or dropped,
//! and every write is applied on [`commit`](TripUnitOfWork::commit) or not at
//! all. Callers lock in the order Trip, Vehicle, Driver.

use std::future::Future;

use crate::error::CoreError;
use crate::fleet::{Driver, DriverStatus, Trip, TripStatus, Vehicle, VehicleStatus};
use crate::types::{DbId, Timestamp};

/// Insert payload for a new Draft trip.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub vehicle_id: DbId,
    pub driver_id: DbId,
    pub origin: String,
    pub destination: String,
    pub cargo_weight: f64,
    pub odometer_start: f64,
    pub created_at: Timestamp,
}

/// Status change for an existing trip. `None` fields are left as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TripStatusUpdate {
    pub status: TripStatus,
    pub dispatched_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub odometer_end: Option<f64>,
}

impl TripStatusUpdate {
    pub fn status(status: TripStatus) -> Self {
        Self {
            status,
            dispatched_at: None,
            completed_at: None,
            odometer_end: None,
        }
    }
}

/// Per-driver trip counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCounter {
    TripsCompleted,
    TripsCancelled,
}

impl DriverCounter {
    /// Column holding the counter.
    pub fn column(self) -> &'static str {
        match self {
            DriverCounter::TripsCompleted => "trips_completed",
            DriverCounter::TripsCancelled => "trips_cancelled",
        }
    }
}

/// A source of atomic units of work over vehicles, drivers and trips.
pub trait TripStore: Send + Sync {
    type Unit: TripUnitOfWork;

    /// Open a unit of work. Dropping it without committing discards its writes.
    fn begin(&self) -> impl Future<Output = Result<Self::Unit, CoreError>> + Send;
}

/// One atomic scope. Reads lock, writes are buffered until commit.
pub trait TripUnitOfWork: Send {
    fn trip(&mut self, id: DbId)
        -> impl Future<Output = Result<Option<Trip>, CoreError>> + Send;

    fn vehicle(&mut self, id: DbId)
        -> impl Future<Output = Result<Option<Vehicle>, CoreError>> + Send;

    fn driver(&mut self, id: DbId)
        -> impl Future<Output = Result<Option<Driver>, CoreError>> + Send;

    fn insert_trip(
        &mut self,
        trip: &NewTrip,
    ) -> impl Future<Output = Result<Trip, CoreError>> + Send;

    fn update_vehicle_status(
        &mut self,
        id: DbId,
        status: VehicleStatus,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn update_vehicle_odometer(
        &mut self,
        id: DbId,
        odometer: f64,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn update_driver_status(
        &mut self,
        id: DbId,
        status: DriverStatus,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn increment_driver_counter(
        &mut self,
        id: DbId,
        counter: DriverCounter,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn update_trip_status(
        &mut self,
        id: DbId,
        update: &TripStatusUpdate,
    ) -> impl Future<Output = Result<Trip, CoreError>> + Send;

    /// Apply every write made through this handle.
    fn commit(self) -> impl Future<Output = Result<(), CoreError>> + Send;
}
