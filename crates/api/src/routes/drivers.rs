//! Mounted at `/drivers` by `api_routes()`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::drivers;
use crate::state::AppState;

/// ```text
/// GET    /               -> list_drivers
/// POST   /               -> create_driver
/// GET    /{id}           -> get_driver
/// PATCH  /{id}/status    -> update_driver_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(drivers::list_drivers).post(drivers::create_driver))
        .route("/{id}", get(drivers::get_driver))
        .route("/{id}/status", patch(drivers::update_driver_status))
}
