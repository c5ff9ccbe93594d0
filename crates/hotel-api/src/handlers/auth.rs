//! Authentication API handlers
//!
//! Provides HTTP endpoints for registration, login and the caller's profile.

use super::{json_body, require_admin};
use crate::audit::extract_ip_address;
use crate::auth::{AuthResponse, CurrentUser, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use hotel_core::UserPublic;
use std::sync::Arc;

/// Register a new user account
///
/// # Responses
///
/// * `201 Created` - User successfully registered
/// * `400 Bad Request` - Invalid input
/// * `409 Conflict` - Email already registered
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserPublic),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 409, description = "Email already registered", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.accounts.register(json_body(payload)?).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with email and password
///
/// Returns a bearer token valid for 24 hours.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let response = state
        .accounts
        .login(json_body(payload)?, extract_ip_address(&headers))
        .await?;

    Ok(Json(response))
}

/// Get current user profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = UserPublic),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.accounts.me(&identity).await?;

    Ok(Json(user))
}

/// Create an admin account (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "admin",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Admin created", body = UserPublic),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn register_admin_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&identity, "admin/users")?;
    let user = state
        .accounts
        .register_admin(json_body(payload)?, &identity)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}
