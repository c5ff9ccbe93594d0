//! Booking API handlers
//!
//! The owner of every booking comes from [`CurrentUser`], never from the
//! request body.

use super::json_body;
use crate::audit::{audit_log, AuditEvent};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hotel_core::{Booking, BookingCandidate, HotelError};
use std::sync::Arc;

/// Create a booking for the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "bookings",
    request_body = BookingCandidate,
    responses(
        (status = 201, description = "Booking admitted", body = Booking),
        (status = 400, description = "Invalid booking", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Json<BookingCandidate>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.bookings.admit(json_body(payload)?, &identity).await?;

    audit_log(&AuditEvent::BookingAdmitted {
        booking_id: booking.id.clone(),
        user_id: booking.user_id.clone(),
        room_id: booking.room_id.clone(),
    });

    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "bookings",
    responses(
        (status = 200, description = "Bookings", body = Vec<Booking>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.bookings.list(&identity).await?;

    Ok(Json(bookings))
}

/// Get a single booking
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "bookings",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 403, description = "Booking belongs to another user", body = crate::error::ApiError),
        (status = 404, description = "Booking not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .bookings
        .get(&id, &identity)
        .await
        .inspect_err(|e| deny_audit(e, &identity.id, &id))?;

    Ok(Json(booking))
}

/// Cancel a booking (owner or admin)
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "bookings",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 403, description = "Booking belongs to another user", body = crate::error::ApiError),
        (status = 404, description = "Booking not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .bookings
        .cancel(&id, &identity)
        .await
        .inspect_err(|e| deny_audit(e, &identity.id, &id))?;

    audit_log(&AuditEvent::BookingCancelled {
        booking_id: booking.id.clone(),
        owner_id: booking.user_id.clone(),
        cancelled_by: identity.id.clone(),
    });

    Ok(Json(booking))
}

fn deny_audit(err: &HotelError, user_id: &str, booking_id: &str) {
    if let HotelError::Forbidden(reason) = err {
        audit_log(&AuditEvent::AccessDenied {
            user_id: user_id.to_string(),
            resource: format!("bookings/{booking_id}"),
            reason: reason.clone(),
        });
    }
}
