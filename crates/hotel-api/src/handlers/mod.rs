//! API request handlers

pub mod auth;
pub mod bookings;
pub mod health;
pub mod hotels;
pub mod users;

use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use hotel_core::Identity;

/// Unwrap a JSON body, reporting malformed input as 400
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))
}

/// Reject non-admin callers
pub(crate) fn require_admin(identity: &Identity, resource: &str) -> Result<(), AppError> {
    if identity.is_admin {
        return Ok(());
    }

    audit_log(&AuditEvent::AccessDenied {
        user_id: identity.id.clone(),
        resource: resource.to_string(),
        reason: "admin role required".to_string(),
    });
    Err(AppError::Forbidden("Admin role required".to_string()))
}
