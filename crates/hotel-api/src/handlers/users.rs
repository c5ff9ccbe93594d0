//! Admin user management handlers

use super::{json_body, require_admin};
use crate::auth::{CurrentUser, UpdateUserRequest, UserPage};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hotel_core::UserPublic;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

/// Query parameters for user listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Page number (1-indexed)
    #[param(default = 1)]
    pub page: Option<u32>,

    /// Items per page, at most 100
    #[param(default = 20)]
    pub page_size: Option<u32>,
}

/// List user accounts (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "User page", body = UserPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Query(params): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&identity, "admin/users")?;
    let page = state
        .accounts
        .list_users(params.page, params.page_size, &identity)
        .await?;

    Ok(Json(page))
}

/// Get one user account (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserPublic),
        (status = 403, description = "Admin role required", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&identity, "admin/users")?;
    let user = state.accounts.get_user(&id, &identity).await?;

    Ok(Json(user))
}

/// Update a user's name (admin only)
#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserPublic),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 403, description = "Admin role required", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&identity, "admin/users")?;
    let user = state
        .accounts
        .update_user(&id, json_body(payload)?, &identity)
        .await?;

    Ok(Json(user))
}

/// Delete a user account without bookings (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
        (status = 409, description = "User still has bookings", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&identity, "admin/users")?;
    state.accounts.delete_user(&id, &identity).await?;

    Ok(StatusCode::NO_CONTENT)
}
