//! Route definitions for the trip lifecycle.
//!
//! Mounted at `/trips` by `api_routes()`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::trips;
use crate::state::AppState;

/// ```text
/// GET    /               -> list_trips
/// POST   /               -> create_trip
/// GET    /{id}           -> get_trip
/// PATCH  /{id}/dispatch  -> dispatch_trip
/// PATCH  /{id}/complete  -> complete_trip
/// PATCH  /{id}/cancel    -> cancel_trip
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trips::list_trips).post(trips::create_trip))
        .route("/{id}", get(trips::get_trip))
        .route("/{id}/dispatch", patch(trips::dispatch_trip))
        .route("/{id}/complete", patch(trips::complete_trip))
        .route("/{id}/cancel", patch(trips::cancel_trip))
}
