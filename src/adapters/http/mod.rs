//! HTTP adapters - REST API implementations.
//!
//! `app` assembles the integration router with the cross-cutting layers:
//! request tracing, CORS and a per-request timeout.

pub mod integration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use integration::{integration_router, IntegrationAppState, IntegrationSettings};

/// The complete service router.
pub fn app(state: IntegrationAppState, server: &ServerConfig) -> Router {
    integration_router()
        .with_state(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

/// Any origin when none are configured, otherwise the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let allow_origin = if parsed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}
