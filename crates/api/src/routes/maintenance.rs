//! Mounted at `/maintenance` by `api_routes()`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::maintenance;
use crate::state::AppState;

/// ```text
/// GET    /               -> list_maintenance
/// POST   /               -> open_maintenance
/// PATCH  /{id}/complete  -> complete_maintenance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(maintenance::list_maintenance).post(maintenance::open_maintenance),
        )
        .route("/{id}/complete", patch(maintenance::complete_maintenance))
}
