//! OpenAPI document

use crate::auth::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserPage};
use crate::error::ApiError;
use crate::handlers::{auth, bookings, health, hotels, users};
use hotel_core::{
    Booking, BookingCandidate, BookingStatus, Hotel, NewHotelParams, NewRoomParams, Room,
    UserPublic,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register_handler,
        auth::login_handler,
        auth::me_handler,
        auth::register_admin_handler,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        hotels::list_hotels,
        hotels::create_hotel,
        hotels::list_rooms,
        hotels::create_room,
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::cancel_booking,
    ),
    components(schemas(
        ApiError,
        health::HealthResponse,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UpdateUserRequest,
        UserPage,
        UserPublic,
        Hotel,
        NewHotelParams,
        Room,
        NewRoomParams,
        Booking,
        BookingCandidate,
        BookingStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration, login and profile"),
        (name = "admin", description = "User management for administrators"),
        (name = "hotels", description = "Hotel and room inventory"),
        (name = "bookings", description = "Booking admission and cancellation"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
