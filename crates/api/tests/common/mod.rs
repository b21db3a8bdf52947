#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fleetflow_api::config::ServerConfig;
use fleetflow_api::router::build_app_router;
use fleetflow_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Some(body)).await
}

/// PATCH with no body, as the transition buttons send it.
pub async fn patch_empty(app: Router, uri: &str) -> Response {
    send(app, Method::PATCH, uri, None).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Fleet fixtures
// ---------------------------------------------------------------------------

/// Register a 2000kg truck at 45200km and return its id.
pub async fn create_truck(pool: &PgPool, plate: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/vehicles",
        serde_json::json!({
            "name": "Truck-01",
            "model": "Tata Ace",
            "plate": plate,
            "vehicle_type": "Truck",
            "max_capacity": 2000.0,
            "odometer": 45200.0,
            "region": "North"
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Register a driver with the given categories and expiry (`YYYY-MM-DD`).
pub async fn create_driver(pool: &PgPool, license_number: &str, categories: &str, expiry: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/drivers",
        serde_json::json!({
            "name": "Alex Johnson",
            "license_number": license_number,
            "license_category": categories,
            "license_expiry": expiry
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
