//! Application builder: wires router, filter chain and state into an Axum app.

use std::any::Any;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use edgeguard_core::error::AppError;

use crate::error::ApiError;
use crate::middleware::{auth, cors, identity, metrics, path, rate_limit, trace};
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with the edge filter chain.
pub fn build_app(state: AppState) -> Router {
    let routes = build_router(state.clone());
    apply_filter_chain(state, routes)
}

/// Wraps `routes` in the edge filter chain.
///
/// Stages run outermost first. CORS, when configured, wraps the whole chain
/// so preflight requests are answered before admission or auth.
///
/// 1. trace id assignment, which also completes rejection bodies
/// 2. metrics, which sees every outcome of the stages below
/// 3. panic recovery into a normalized 500
/// 4. canonical path check
/// 5. rate admission
/// 6. authentication and route policy
/// 7. identity propagation
pub fn apply_filter_chain(state: AppState, routes: Router) -> Router {
    let cors = cors::build_cors_layer(&state.config.server.cors);
    let chain = ServiceBuilder::new()
        .layer(from_fn(trace::assign_trace_id))
        .layer(from_fn_with_state(state.clone(), metrics::record_metrics))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(path::reject_ambiguous_path))
        .layer(from_fn_with_state(state.clone(), rate_limit::admit_request))
        .layer(from_fn_with_state(state, auth::authenticate))
        .layer(from_fn(identity::propagate_identity));

    let app = routes.layer(chain);
    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError(AppError::internal(format!("Handler panicked: {detail}"))).into_response()
}
