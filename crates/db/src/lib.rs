//! PostgreSQL persistence for fleet records.
//!
//! - [`models`]: row structs and request DTOs
//! - [`repositories`]: query functions per table
//! - [`trip_store`]: the transactional [`TripStore`](fleetflow_core::trip_lifecycle::TripStore)
//!   used by the trip state machine

pub mod models;
pub mod repositories;
pub mod trip_store;

use std::time::Duration;

use fleetflow_core::error::CoreError;
use sqlx::postgres::PgPoolOptions;

pub use trip_store::PgTripStore;

pub type DbPool = sqlx::PgPool;

/// Connection pool sizing.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a caller waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, settings: &PoolSettings) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Client-facing message for a named unique constraint.
pub fn unique_violation_message(constraint: &str) -> Option<&'static str> {
    match constraint {
        "uq_vehicles_plate" => Some("License plate already exists"),
        "uq_drivers_license_number" => Some("License number already exists"),
        "uq_trips_dispatched_vehicle" => Some("Vehicle already has a dispatched trip"),
        "uq_trips_dispatched_driver" => Some("Driver already has a dispatched trip"),
        _ => None,
    }
}

/// Wrap a driver error for the storage-agnostic core.
///
/// Unique violations surface as [`CoreError::Conflict`].
pub(crate) fn storage_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            tracing::warn!(constraint, "Trip store write rejected");
            let message = unique_violation_message(constraint)
                .map(str::to_owned)
                .unwrap_or_else(|| format!("Duplicate value violates unique constraint: {constraint}"));
            return CoreError::Conflict(message);
        }
    }
    tracing::error!(error = %err, "Trip store query failed");
    CoreError::Storage(err.to_string())
}
