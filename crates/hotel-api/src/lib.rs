//! Hotel reservation REST API
//!
//! Public endpoints handle registration and login. Everything else sits
//! behind [`auth::auth_middleware`], which turns the bearer token into an
//! [`hotel_core::Identity`] for the handlers.

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::{routing::get, Json, Router};
use hotel_core::config::{AppConfig, AuthConfig};
use openapi::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Build the application router over shared state
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// In-memory state signed with `secret`, for tests
pub fn create_state_for_testing(secret: &str) -> Arc<AppState> {
    let config = AppConfig {
        auth: AuthConfig::new(secret),
        ..AppConfig::default()
    };
    Arc::new(AppState::in_memory(config))
}

/// Router over fresh in-memory state, for tests
pub fn create_router_for_testing(secret: &str) -> Router {
    create_router(create_state_for_testing(secret))
}
