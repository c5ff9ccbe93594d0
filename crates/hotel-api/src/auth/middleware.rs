//! Authentication gate for protected routes
//!
//! Extracts the bearer token from the Authorization header, verifies it with
//! the shared [`TokenAuthority`], and inserts the resolved [`Identity`] into
//! the extensions of that request only. Handlers receive it through the
//! [`CurrentUser`] extractor.

use super::token::{TokenAuthority, TokenError};
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::state::AppState;
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use hotel_core::Identity;
use std::sync::Arc;
use thiserror::Error;

/// Auth gate rejections
///
/// Everything except expiry collapses into the same "Unauthorized" response
/// so callers learn nothing about why a credential was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredential,

    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Token expired")]
    TokenExpired,
}

impl AuthError {
    /// Message returned to the client
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential | AuthError::InvalidCredential => "Unauthorized",
            AuthError::TokenExpired => "Token expired",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;
        let body = serde_json::json!({
            "error": self.public_message(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Pull the token out of the Authorization header
///
/// Accepts both `Authorization: <token>` and `Authorization: Bearer <token>`.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Resolve the caller's identity from request headers
pub fn authenticate(headers: &HeaderMap, tokens: &TokenAuthority) -> Result<Identity, AuthError> {
    authenticate_at(headers, tokens, Utc::now())
}

/// Resolve the caller's identity against the clock value `now`
pub fn authenticate_at(
    headers: &HeaderMap,
    tokens: &TokenAuthority,
    now: DateTime<Utc>,
) -> Result<Identity, AuthError> {
    let Some(token) = extract_token(headers) else {
        audit_log(&AuditEvent::InvalidToken {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
            reason: "missing credential".to_string(),
        });
        return Err(AuthError::MissingCredential);
    };

    match tokens.verify_at(token, now) {
        Ok(identity) => Ok(identity),
        Err(TokenError::TokenExpired) => {
            audit_log(&AuditEvent::ExpiredToken {
                ip_address: extract_ip_address(headers),
                user_agent: extract_user_agent(headers),
            });
            Err(AuthError::TokenExpired)
        }
        Err(e) => {
            audit_log(&AuditEvent::InvalidToken {
                ip_address: extract_ip_address(headers),
                user_agent: extract_user_agent(headers),
                reason: e.to_string(),
            });
            Err(AuthError::InvalidCredential)
        }
    }
}

/// Authentication middleware that requires a valid token
///
/// ```ignore
/// let protected = Router::new()
///     .route("/bookings", post(create_booking))
///     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = authenticate(request.headers(), &state.tokens)?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Identity resolved by [`auth_middleware`] for the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingCredential)
    }
}
