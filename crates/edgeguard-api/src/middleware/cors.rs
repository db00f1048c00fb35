//! CORS layer configuration.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

use edgeguard_core::config::CorsConfig;

use super::trace::TRACE_ID_HEADER;

/// Builds a CORS tower layer from configuration, or `None` when no origin
/// is allowed.
///
/// Browsers may send `Authorization` and `X-Trace-Id`, and may read the
/// echoed trace id and `Retry-After`.
pub fn build_cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return None;
    }

    let mut layer = CorsLayer::new();

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let trace_header = HeaderName::from_static(TRACE_ID_HEADER);
    Some(
        layer
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, trace_header.clone()])
            .expose_headers([trace_header, header::RETRY_AFTER])
            .max_age(Duration::from_secs(config.max_age_seconds)),
    )
}
