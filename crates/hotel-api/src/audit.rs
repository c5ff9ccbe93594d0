//! Security audit logging
//!
//! Authentication and booking-authorization events are logged at INFO level
//! with the "audit" target, so they can be filtered and routed separately
//! from application logs. Each event is also serialized to JSON in the
//! `event` field for log aggregators.
//!
//! ```ignore
//! use hotel_api::audit::{audit_log, AuditEvent};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: user.id.clone(),
//!     email: user.email.clone(),
//!     ip_address: Some("192.168.1.1".to_string()),
//! });
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful login
    LoginSuccess {
        user_id: String,
        email: String,
        ip_address: Option<String>,
    },

    /// Failed login attempt
    LoginFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
    },

    /// Account created
    Registration {
        user_id: String,
        email: String,
        is_admin: bool,
        created_by: Option<String>,
    },

    /// Existing account promoted to admin at startup
    AdminPromoted { user_id: String, email: String },

    /// Account profile changed by an admin
    UserUpdated { user_id: String, updated_by: String },

    /// Account removed by an admin
    UserDeleted { user_id: String, deleted_by: String },

    /// Missing, malformed or forged credential
    InvalidToken {
        ip_address: Option<String>,
        user_agent: Option<String>,
        reason: String,
    },

    /// Credential past its expiry
    ExpiredToken {
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Authenticated caller denied an action
    AccessDenied {
        user_id: String,
        resource: String,
        reason: String,
    },

    /// Booking recorded
    BookingAdmitted {
        booking_id: String,
        user_id: String,
        room_id: String,
    },

    /// Booking cancelled
    BookingCancelled {
        booking_id: String,
        owner_id: String,
        cancelled_by: String,
    },
}

/// Log a security audit event with structured fields
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::LoginSuccess {
            user_id,
            email,
            ip_address,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                email = %email,
                ip_address = ?ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            email,
            reason,
            ip_address,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                email = %email,
                reason = %reason,
                ip_address = ?ip_address,
                "Login failed"
            );
        }
        AuditEvent::Registration {
            user_id,
            email,
            is_admin,
            created_by,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                email = %email,
                is_admin = %is_admin,
                created_by = ?created_by,
                "User registered"
            );
        }
        AuditEvent::AdminPromoted { user_id, email } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "User promoted to admin"
            );
        }
        AuditEvent::UserUpdated {
            user_id,
            updated_by,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                updated_by = %updated_by,
                "User updated"
            );
        }
        AuditEvent::UserDeleted {
            user_id,
            deleted_by,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                deleted_by = %deleted_by,
                "User deleted"
            );
        }
        AuditEvent::InvalidToken {
            ip_address, reason, ..
        } => {
            info!(
                target: "audit",
                event = %event_json,
                ip_address = ?ip_address,
                reason = %reason,
                "Invalid token"
            );
        }
        AuditEvent::ExpiredToken { ip_address, .. } => {
            info!(
                target: "audit",
                event = %event_json,
                ip_address = ?ip_address,
                "Expired token"
            );
        }
        AuditEvent::AccessDenied {
            user_id,
            resource,
            reason,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                resource = %resource,
                reason = %reason,
                "Access denied"
            );
        }
        AuditEvent::BookingAdmitted {
            booking_id,
            user_id,
            room_id,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                booking_id = %booking_id,
                user_id = %user_id,
                room_id = %room_id,
                "Booking admitted"
            );
        }
        AuditEvent::BookingCancelled {
            booking_id,
            owner_id,
            cancelled_by,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                booking_id = %booking_id,
                owner_id = %owner_id,
                cancelled_by = %cancelled_by,
                "Booking cancelled"
            );
        }
    }
}

/// Extract the client IP address from proxy headers
///
/// Checks `X-Forwarded-For` (first hop) and then `X-Real-IP`.
pub fn extract_ip_address(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|ip| ip.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract user agent from request headers
pub fn extract_user_agent(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}
