//! PostgreSQL implementation of the trip state machine's storage contract.
//!
//! One unit of work is one transaction. Reads use `SELECT ... FOR UPDATE`, so
//! concurrent transitions touching the same trip, vehicle or driver queue up
//! behind each other. Dropping a [`PgUnitOfWork`] rolls the transaction back.

use std::time::Duration;

use fleetflow_core::error::CoreError;
use fleetflow_core::fleet::{Driver, DriverStatus, Trip, Vehicle, VehicleStatus};
use fleetflow_core::trip_lifecycle::{
    DriverCounter, NewTrip, TripStatusUpdate, TripStore, TripUnitOfWork,
};
use fleetflow_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::repositories::{DriverRepo, TripRepo, VehicleRepo};
use crate::storage_error;

/// Default cap on how long a transition waits for a row lock.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct PgTripStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgTripStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl TripStore for PgTripStore {
    type Unit = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, CoreError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        // Scoped to this transaction only.
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        Ok(PgUnitOfWork { tx })
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl TripUnitOfWork for PgUnitOfWork {
    async fn trip(&mut self, id: DbId) -> Result<Option<Trip>, CoreError> {
        TripRepo::lock_by_id(&mut *self.tx, id)
            .await
            .map_err(storage_error)
    }

    async fn vehicle(&mut self, id: DbId) -> Result<Option<Vehicle>, CoreError> {
        VehicleRepo::lock_by_id(&mut *self.tx, id)
            .await
            .map_err(storage_error)
    }

    async fn driver(&mut self, id: DbId) -> Result<Option<Driver>, CoreError> {
        DriverRepo::lock_by_id(&mut *self.tx, id)
            .await
            .map_err(storage_error)
    }

    async fn insert_trip(&mut self, trip: &NewTrip) -> Result<Trip, CoreError> {
        TripRepo::insert(&mut *self.tx, trip)
            .await
            .map_err(storage_error)
    }

    async fn update_vehicle_status(
        &mut self,
        id: DbId,
        status: VehicleStatus,
    ) -> Result<(), CoreError> {
        let updated = VehicleRepo::update_status(&mut *self.tx, id, status)
            .await
            .map_err(storage_error)?;
        require_row(updated, "Vehicle", id)
    }

    async fn update_vehicle_odometer(&mut self, id: DbId, odometer: f64) -> Result<(), CoreError> {
        let updated = VehicleRepo::update_odometer(&mut *self.tx, id, odometer)
            .await
            .map_err(storage_error)?;
        require_row(updated, "Vehicle", id)
    }

    async fn update_driver_status(
        &mut self,
        id: DbId,
        status: DriverStatus,
    ) -> Result<(), CoreError> {
        let updated = DriverRepo::update_status(&mut *self.tx, id, status)
            .await
            .map_err(storage_error)?;
        require_row(updated, "Driver", id)
    }

    async fn increment_driver_counter(
        &mut self,
        id: DbId,
        counter: DriverCounter,
    ) -> Result<(), CoreError> {
        let updated = DriverRepo::increment_counter(&mut *self.tx, id, counter)
            .await
            .map_err(storage_error)?;
        require_row(updated, "Driver", id)
    }

    async fn update_trip_status(
        &mut self,
        id: DbId,
        update: &TripStatusUpdate,
    ) -> Result<Trip, CoreError> {
        TripRepo::update_status(&mut *self.tx, id, update)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::not_found("Trip", id))
    }

    async fn commit(self) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(storage_error)
    }
}

fn require_row(updated: bool, entity: &'static str, id: DbId) -> Result<(), CoreError> {
    if updated {
        Ok(())
    } else {
        Err(CoreError::not_found(entity, id))
    }
}
