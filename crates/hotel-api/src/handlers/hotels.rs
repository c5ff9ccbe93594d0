//! Hotel and room inventory handlers

use super::{json_body, require_admin};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hotel_core::{Hotel, NewHotelParams, NewRoomParams, Room};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/v1/hotels",
    tag = "hotels",
    responses(
        (status = 200, description = "All hotels", body = Vec<Hotel>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_hotels(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let hotels = state.inventory.list_hotels().await?;

    Ok(Json(hotels))
}

#[utoipa::path(
    post,
    path = "/api/v1/hotels",
    tag = "hotels",
    request_body = NewHotelParams,
    responses(
        (status = 201, description = "Hotel created", body = Hotel),
        (status = 403, description = "Admin role required", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_hotel(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Json<NewHotelParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&identity, "hotels")?;
    let hotel = state.inventory.add_hotel(json_body(payload)?).await?;

    Ok((StatusCode::CREATED, Json(hotel)))
}

#[utoipa::path(
    get,
    path = "/api/v1/hotels/{id}/rooms",
    tag = "hotels",
    params(("id" = String, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Rooms of the hotel", body = Vec<Room>),
        (status = 404, description = "Hotel not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Path(hotel_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rooms = state.inventory.list_rooms(&hotel_id).await?;

    Ok(Json(rooms))
}

#[utoipa::path(
    post,
    path = "/api/v1/hotels/{id}/rooms",
    tag = "hotels",
    params(("id" = String, Path, description = "Hotel ID")),
    request_body = NewRoomParams,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 403, description = "Admin role required", body = crate::error::ApiError),
        (status = 404, description = "Hotel not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(hotel_id): Path<String>,
    payload: Result<Json<NewRoomParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&identity, "hotels/rooms")?;
    let room = state
        .inventory
        .add_room(&hotel_id, json_body(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(room)))
}
