//! OSE advisory gateway, RPC surface
//!
//! | route | RPC |
//! |---|---|
//! | `POST /v1/blueprints:generate` | GenerateBlueprint |
//! | `POST /v1/patterns:search` | SearchPatterns |
//! | `POST /v1/services:validate` | ValidateService |
//! | `POST /v1/services:register` | RegisterService |
//!
//! plus `/health`, `/ready` and `/metrics`.
pub mod config;
pub mod error;
pub mod feedback;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod state;
pub mod synergy;

pub use config::{AdvisoryConfig, ConfigError};
pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState, config: &AdvisoryConfig) -> Router {
    Router::new()
        .route("/v1/blueprints:generate", post(handlers::generate_blueprint))
        .route("/v1/patterns:search", post(handlers::search_patterns))
        .route("/v1/services:validate", post(handlers::validate_service))
        .route("/v1/services:register", post(handlers::register_service))
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::log_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .with_state(state)
}
