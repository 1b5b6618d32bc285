use crate::http::handlers::{get_measurements, post_measurement, test_availability, AppState};
use crate::http::server::HttpServerConfig;
use axum::routing::get;
use axum::Router;
use common::http::HttpLoggingLayer;
use tower_http::timeout::TimeoutLayer;

/// Build the measurement routes with request logging and a request timeout
pub fn create_router(state: AppState, config: &HttpServerConfig) -> Router {
    Router::new()
        .route("/measurements", get(get_measurements).post(post_measurement))
        .route(
            "/testavailability",
            get(test_availability).post(test_availability),
        )
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(HttpLoggingLayer::new(config.logging_config.clone()))
        .with_state(state)
}
