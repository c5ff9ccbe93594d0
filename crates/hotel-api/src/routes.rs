//! API route definitions

use crate::auth::middleware::auth_middleware;
use crate::handlers::{auth, bookings, hotels, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        // Admin user management
        .route(
            "/admin/users",
            get(users::list_users).post(auth::register_admin_handler),
        )
        .route(
            "/admin/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Inventory endpoints
        .route("/hotels", get(hotels::list_hotels).post(hotels::create_hotel))
        .route(
            "/hotels/:id/rooms",
            get(hotels::list_rooms).post(hotels::create_room),
        )
        // Booking endpoints
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
