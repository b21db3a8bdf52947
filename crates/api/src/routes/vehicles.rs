//! Mounted at `/vehicles` by `api_routes()`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::vehicles;
use crate::state::AppState;

/// ```text
/// GET    /               -> list_vehicles
/// POST   /               -> create_vehicle
/// GET    /{id}           -> get_vehicle
/// PATCH  /{id}/status    -> update_vehicle_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route("/{id}", get(vehicles::get_vehicle))
        .route("/{id}/status", patch(vehicles::update_vehicle_status))
}
