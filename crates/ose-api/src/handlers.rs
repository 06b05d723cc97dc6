//! RPC and operational handlers
use crate::error::ApiError;
use crate::feedback::{self, RegisterServiceRequest, RegisterServiceResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ose_core::{Blueprint, OseError, PatternSummary, RequestContext, ServiceConstraints};
use ose_orchestrator::BlueprintRequest;
use ose_validation::{validate_constraints, ValidationOutcome};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 10;
pub const MAX_TOP_K: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPatternsRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub constraints: Option<ServiceConstraints>,
    /// 0 means the default
    #[serde(default)]
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPatternsResponse {
    pub patterns: Vec<PatternSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateServiceRequest {
    #[serde(default)]
    pub constraints: ServiceConstraints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateServiceResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<ValidationOutcome> for ValidateServiceResponse {
    fn from(outcome: ValidationOutcome) -> Self {
        match outcome.into_result() {
            Ok(()) => Self {
                valid: true,
                error_message: None,
                field: None,
                suggestion: None,
            },
            Err(violation) => Self {
                valid: false,
                error_message: Some(violation.message),
                field: Some(violation.field),
                suggestion: Some(violation.suggestion),
            },
        }
    }
}

/// POST /v1/blueprints:generate
pub async fn generate_blueprint(
    State(state): State<AppState>,
    payload: Result<Json<BlueprintRequest>, JsonRejection>,
) -> Result<Json<Blueprint>, ApiError> {
    let Json(request) = payload?;
    let ctx = RequestContext::new("GenerateBlueprint");

    let blueprint = state.orchestrator.generate(&request, &ctx).await?;
    Ok(Json(blueprint))
}

/// POST /v1/patterns:search
pub async fn search_patterns(
    State(state): State<AppState>,
    payload: Result<Json<SearchPatternsRequest>, JsonRejection>,
) -> Result<Json<SearchPatternsResponse>, ApiError> {
    let Json(request) = payload?;

    let top_k = match request.top_k {
        0 => DEFAULT_TOP_K,
        k if k > MAX_TOP_K => {
            return Err(ApiError::invalid(
                "top_k",
                format!("top_k must be at most {}, got {}", MAX_TOP_K, k),
                format!("Request {} results or fewer, or 0 for the default", MAX_TOP_K),
            ))
        }
        k => k,
    };

    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    let patterns = match (query, request.constraints) {
        (Some(text), None) => {
            debug!(query = %text, top_k, "searching patterns by text");
            bounded(&state, state.patterns.search(text, top_k)).await?
        }
        (None, Some(constraints)) => {
            if let Some(violation) = validate_constraints(&constraints).violation() {
                return Err(ApiError::InvalidArgument(violation.clone()));
            }
            debug!(service_name = %constraints.service_name, top_k, "searching patterns by constraints");
            let mut found: Vec<PatternSummary> = bounded(&state, state.patterns.query(&constraints))
                .await?
                .into_iter()
                .filter(|p| !constraints.is_excluded(&p.pattern_id))
                .map(PatternSummary::from)
                .collect();
            found.truncate(top_k);
            found
        }
        (Some(_), Some(_)) => {
            return Err(ApiError::invalid(
                "query",
                "query and constraints are mutually exclusive",
                "Send either a free-text query or a constraints object, not both",
            ))
        }
        (None, None) => {
            return Err(ApiError::invalid(
                "query",
                "either query or constraints is required",
                "Send a free-text query such as 'circuit breaker', or a constraints object",
            ))
        }
    };

    Ok(Json(SearchPatternsResponse { patterns }))
}

/// POST /v1/services:validate
pub async fn validate_service(
    payload: Result<Json<ValidateServiceRequest>, JsonRejection>,
) -> Result<Json<ValidateServiceResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = validate_constraints(&request.constraints);

    if let Some(class) = outcome.class() {
        debug!(service_name = %request.constraints.service_name, class = %class, "constraints invalid");
    }

    Ok(Json(ValidateServiceResponse::from(outcome)))
}

/// POST /v1/services:register
pub async fn register_service(
    State(state): State<AppState>,
    payload: Result<Json<RegisterServiceRequest>, JsonRejection>,
) -> Result<Json<RegisterServiceResponse>, ApiError> {
    let Json(request) = payload?;

    let response = feedback::register(&request, &state.confidence, &state.observations)?;

    if let Some(metrics) = &state.metrics {
        metrics.observe_quality(response.overall_score);
    }

    Ok(Json(response))
}

/// Liveness
pub async fn health() -> &'static str {
    "OK"
}

/// Readiness
pub async fn ready(State(state): State<AppState>) -> &'static str {
    debug!(uptime_secs = state.started_at.elapsed().as_secs(), "readiness check");
    "READY"
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => ApiError::Internal(format!("metrics encoding failed: {}", err)).into_response(),
    }
}

/// Run one pattern source call under the per-call timeout
async fn bounded<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ose_core::SourceError>>,
{
    let budget = state.call_timeout();
    match tokio::time::timeout(budget, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(OseError::Source(err).into()),
        Err(_) => Err(OseError::Timeout {
            stage: "patterns",
            source_id: state.patterns.id(),
            budget_ms: budget.as_millis() as u64,
        }
        .into()),
    }
}
