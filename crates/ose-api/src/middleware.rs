//! Request logging and panic recovery
use crate::error::ErrorResponse;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::any::Any;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// RPC name for a route, `None` for operational endpoints
pub fn rpc_method(path: &str) -> Option<&'static str> {
    match path {
        "/v1/blueprints:generate" => Some("GenerateBlueprint"),
        "/v1/patterns:search" => Some("SearchPatterns"),
        "/v1/services:validate" => Some("ValidateService"),
        "/v1/services:register" => Some("RegisterService"),
        _ => None,
    }
}

/// Log method, duration and terminal status of every RPC and record metrics
pub async fn log_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();
    let duration_ms = elapsed.as_millis() as u64;

    let Some(method) = rpc_method(&path) else {
        debug!(path = %path, status = status.as_u16(), duration_ms, "request completed");
        return response;
    };

    if status.is_server_error() {
        error!(method, status = status.as_u16(), duration_ms, "rpc failed");
    } else if status.is_client_error() {
        warn!(method, status = status.as_u16(), duration_ms, "rpc rejected");
    } else {
        info!(method, status = status.as_u16(), duration_ms, "rpc completed");
    }

    if let Some(metrics) = &state.metrics {
        metrics.observe_request(method, status.as_u16(), elapsed.as_secs_f64());
    }

    response
}

/// Turn a handler panic into the generic internal error
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal()),
    )
        .into_response()
}
