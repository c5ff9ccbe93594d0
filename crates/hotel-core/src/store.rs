//! Store collaborator traits
//!
//! Each store is responsible for its own concurrency safety and retry
//! policy. Inserts assign the entity identifier and return the stored
//! record; lookups return `Ok(None)` for a missing entity.

use async_trait::async_trait;

use crate::models::{Booking, Hotel, Room, User};
use crate::Result;

/// User account storage
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a user; fails with `Conflict` when the email is taken
    async fn insert_user(&self, user: User) -> Result<User>;

    /// Page through users ordered by creation time, oldest first
    async fn list_users(&self, limit: usize, offset: usize) -> Result<Vec<User>>;

    /// Replace a user record; fails with `NotFound` when absent
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Remove a user. Fails with `NotFound` when absent and with `Conflict`
    /// while any booking still references the user.
    async fn delete_user(&self, id: &str) -> Result<()>;
}

/// Hotel inventory storage
#[async_trait]
pub trait HotelStore: Send + Sync {
    async fn get_hotel(&self, id: &str) -> Result<Option<Hotel>>;

    async fn list_hotels(&self) -> Result<Vec<Hotel>>;

    async fn insert_hotel(&self, hotel: Hotel) -> Result<Hotel>;

    /// Append a room id to a hotel's room list in one step, so concurrent
    /// appends never overwrite each other. Fails with `NotFound` when the
    /// hotel is absent.
    async fn append_room(&self, hotel_id: &str, room_id: &str) -> Result<()>;
}

/// Room inventory storage
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get_room(&self, id: &str) -> Result<Option<Room>>;

    async fn rooms_for_hotel(&self, hotel_id: &str) -> Result<Vec<Room>>;

    async fn insert_room(&self, room: Room) -> Result<Room>;
}

/// Booking storage
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>>;

    /// List bookings, optionally restricted to one owner
    async fn list_bookings(&self, owner_id: Option<&str>) -> Result<Vec<Booking>>;

    async fn insert_booking(&self, booking: Booking) -> Result<Booking>;

    /// Replace a booking record; fails with `NotFound` when absent
    async fn update_booking(&self, booking: &Booking) -> Result<()>;
}
