//! In-memory store
//!
//! Implements every store trait over `tokio::sync::RwLock`-guarded maps.
//! Used when no `DATABASE_URL` is configured and throughout the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Booking, Hotel, Room, User};
use crate::store::{BookingStore, HotelStore, RoomStore, UserStore};
use crate::{HotelError, Result};

/// Process-local store for users, hotels, rooms and bookings
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    hotels: RwLock<HashMap<String, Hotel>>,
    rooms: RwLock<HashMap<String, Room>>,
    bookings: RwLock<HashMap<String, Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn assign_id(id: &mut String) {
    if id.is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_user(&self, mut user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(HotelError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }

        assign_id(&mut user.id);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn list_users(&self, limit: usize, offset: usize) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(users.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(HotelError::not_found("user", user.id.clone())),
        }
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        // Users before bookings, so a booking cannot slip in for a user being removed
        let mut users = self.users.write().await;
        if !users.contains_key(id) {
            return Err(HotelError::not_found("user", id));
        }

        let bookings = self.bookings.read().await;
        if bookings.values().any(|b| b.user_id == id) {
            return Err(HotelError::Conflict(format!("user {id} still has bookings")));
        }

        users.remove(id);
        Ok(())
    }
}

#[async_trait]
impl HotelStore for MemoryStore {
    async fn get_hotel(&self, id: &str) -> Result<Option<Hotel>> {
        Ok(self.hotels.read().await.get(id).cloned())
    }

    async fn list_hotels(&self) -> Result<Vec<Hotel>> {
        let mut hotels: Vec<Hotel> = self.hotels.read().await.values().cloned().collect();
        hotels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(hotels)
    }

    async fn insert_hotel(&self, mut hotel: Hotel) -> Result<Hotel> {
        assign_id(&mut hotel.id);
        self.hotels
            .write()
            .await
            .insert(hotel.id.clone(), hotel.clone());
        Ok(hotel)
    }

    async fn append_room(&self, hotel_id: &str, room_id: &str) -> Result<()> {
        let mut hotels = self.hotels.write().await;
        match hotels.get_mut(hotel_id) {
            Some(hotel) => {
                hotel.rooms.push(room_id.to_string());
                Ok(())
            }
            None => Err(HotelError::not_found("hotel", hotel_id)),
        }
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn get_room(&self, id: &str) -> Result<Option<Room>> {
        Ok(self.rooms.read().await.get(id).cloned())
    }

    async fn rooms_for_hotel(&self, hotel_id: &str) -> Result<Vec<Room>> {
        let mut rooms: Vec<Room> = self
            .rooms
            .read()
            .await
            .values()
            .filter(|r| r.hotel_id == hotel_id)
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.floor, r.number));
        Ok(rooms)
    }

    async fn insert_room(&self, mut room: Room) -> Result<Room> {
        assign_id(&mut room.id);
        self.rooms
            .write()
            .await
            .insert(room.id.clone(), room.clone());
        Ok(room)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.bookings.read().await.get(id).cloned())
    }

    async fn list_bookings(&self, owner_id: Option<&str>) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| owner_id.map_or(true, |owner| b.user_id == owner))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(bookings)
    }

    async fn insert_booking(&self, mut booking: Booking) -> Result<Booking> {
        assign_id(&mut booking.id);
        self.bookings
            .write()
            .await
            .insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    async fn update_booking(&self, booking: &Booking) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(HotelError::not_found("booking", booking.id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(
            "Test".to_string(),
            "User".to_string(),
            email.to_string(),
            "hash".to_string(),
            false,
        )
    }

    #[tokio::test]
    async fn test_insert_user_assigns_id() {
        let store = MemoryStore::new();
        let stored = store.insert_user(user("a@example.com")).await.unwrap();

        assert!(!stored.id.is_empty());
        let fetched = store.get_user(&stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(user("a@example.com")).await.unwrap();

        let result = store.insert_user(user("A@example.com")).await;
        assert!(matches!(result, Err(HotelError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = MemoryStore::new();
        store.insert_user(user("a@example.com")).await.unwrap();

        assert!(store.find_by_email("a@example.com").await.unwrap().is_some());
        assert!(store.find_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_room_to_missing_hotel() {
        let store = MemoryStore::new();

        let result = store.append_room("h1", "r1").await;
        assert!(matches!(result, Err(HotelError::NotFound { entity: "hotel", .. })));
    }

    #[tokio::test]
    async fn test_concurrent_room_appends_keep_every_id() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let hotel = store
            .insert_hotel(Hotel {
                id: String::new(),
                name: "Harbour".to_string(),
                location: "Quay".to_string(),
                rooms: vec![],
            })
            .await
            .unwrap();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                let hotel_id = hotel.id.clone();
                tokio::spawn(async move { store.append_room(&hotel_id, &format!("r{i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_hotel(&hotel.id).await.unwrap().unwrap();
        assert_eq!(stored.rooms.len(), 32);
        for i in 0..32 {
            assert!(stored.rooms.contains(&format!("r{i}")));
        }
    }

    #[tokio::test]
    async fn test_list_users_pages_in_creation_order() {
        let store = MemoryStore::new();
        let base = chrono::Utc::now();
        for (offset, email) in ["c@example.com", "a@example.com", "b@example.com"]
            .iter()
            .enumerate()
        {
            let mut u = user(email);
            u.created_at = base + chrono::Duration::seconds(offset as i64);
            store.insert_user(u).await.unwrap();
        }

        let first: Vec<String> = store
            .list_users(2, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(first, vec!["c@example.com", "a@example.com"]);

        let rest = store.list_users(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].email, "b@example.com");
        assert!(store.list_users(2, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_user_replaces_record() {
        let store = MemoryStore::new();
        let mut stored = store.insert_user(user("a@example.com")).await.unwrap();
        stored.first_name = "Renamed".to_string();

        store.update_user(&stored).await.unwrap();
        let fetched = store.get_user(&stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.first_name, "Renamed");

        let mut ghost = user("ghost@example.com");
        ghost.id = "missing".to_string();
        let result = store.update_user(&ghost).await;
        assert!(matches!(result, Err(HotelError::NotFound { entity: "user", .. })));
    }

    #[tokio::test]
    async fn test_delete_user_with_bookings_conflicts() {
        let store = MemoryStore::new();
        let guest = store.insert_user(user("a@example.com")).await.unwrap();
        let loner = store.insert_user(user("b@example.com")).await.unwrap();
        let today = chrono::Utc::now().date_naive();
        store
            .insert_booking(Booking {
                id: String::new(),
                user_id: guest.id.clone(),
                room_id: "r1".to_string(),
                from_date: today,
                till_date: today + chrono::Duration::days(1),
                num_persons: 1,
                status: crate::models::BookingStatus::Active,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let result = store.delete_user(&guest.id).await;
        assert!(matches!(result, Err(HotelError::Conflict(_))));

        store.delete_user(&loner.id).await.unwrap();
        assert!(store.get_user(&loner.id).await.unwrap().is_none());
        let again = store.delete_user(&loner.id).await;
        assert!(matches!(again, Err(HotelError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_rooms_for_hotel_filters() {
        let store = MemoryStore::new();
        for (hotel_id, number) in [("h1", 102), ("h2", 201), ("h1", 101)] {
            store
                .insert_room(Room {
                    id: String::new(),
                    hotel_id: hotel_id.to_string(),
                    number,
                    floor: number / 100,
                    room_type: "single".to_string(),
                    description: String::new(),
                    price: 80.0,
                    occupied: false,
                })
                .await
                .unwrap();
        }

        let rooms = store.rooms_for_hotel("h1").await.unwrap();
        let numbers: Vec<i32> = rooms.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![101, 102]);
    }
}
