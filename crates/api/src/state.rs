use std::sync::Arc;

use fleetflow_core::trip_lifecycle::TripLifecycle;
use fleetflow_db::PgTripStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fleetflow_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Trip state machine over the same pool.
    pub trips: Arc<TripLifecycle<PgTripStore>>,
}

impl AppState {
    pub fn new(pool: fleetflow_db::DbPool, config: ServerConfig) -> Self {
        let trips = TripLifecycle::new(PgTripStore::new(pool.clone()));
        Self {
            pool,
            config: Arc::new(config),
            trips: Arc::new(trips),
        }
    }
}
