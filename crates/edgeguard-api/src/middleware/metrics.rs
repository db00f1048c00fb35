//! Request metrics and access logging.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::state::AppState;

/// Records count and latency by method, route and status, and logs the request.
///
/// Sits directly inside the trace stage and outside panic recovery, so it
/// observes every response, including rejections from later stages and the
/// 500 produced for a panicking handler. `route` is the matched policy
/// pattern, which keeps label cardinality bounded.
pub async fn record_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = state.policies.resolve(&path).pattern.clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    info!(
        method = %method,
        path = %path,
        route = %route,
        status,
        duration_ms = %duration.as_millis(),
        "HTTP request"
    );

    response
}
