pub mod drivers;
pub mod health;
pub mod maintenance;
pub mod trips;
pub mod vehicles;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /vehicles                          list, register
/// /vehicles/{id}                     get
/// /vehicles/{id}/status              manual status change (PATCH)
///
/// /drivers                           list, register
/// /drivers/{id}                      get
/// /drivers/{id}/status               manual status change (PATCH)
///
/// /trips                             list, create (Draft)
/// /trips/{id}                        get
/// /trips/{id}/dispatch               Draft -> Dispatched (PATCH)
/// /trips/{id}/complete               Dispatched -> Completed (PATCH)
/// /trips/{id}/cancel                 Draft|Dispatched -> Cancelled (PATCH)
///
/// /maintenance                       list, open (vehicle -> In Shop)
/// /maintenance/{id}/complete         close (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/vehicles", vehicles::router())
        .nest("/drivers", drivers::router())
        .nest("/trips", trips::router())
        .nest("/maintenance", maintenance::router())
}
