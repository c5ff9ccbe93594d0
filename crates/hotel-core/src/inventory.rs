//! Hotel and room inventory management

use std::sync::Arc;

use tracing::debug;

use crate::models::{Hotel, NewHotelParams, NewRoomParams, Room};
use crate::store::{HotelStore, RoomStore};
use crate::{HotelError, Result};

/// Pass-through inventory operations over the hotel and room stores
#[derive(Clone)]
pub struct InventoryManager {
    hotels: Arc<dyn HotelStore>,
    rooms: Arc<dyn RoomStore>,
}

impl InventoryManager {
    pub fn new(hotels: Arc<dyn HotelStore>, rooms: Arc<dyn RoomStore>) -> Self {
        Self { hotels, rooms }
    }

    pub async fn add_hotel(&self, params: NewHotelParams) -> Result<Hotel> {
        let mut fields = Vec::new();
        if params.name.trim().is_empty() {
            fields.push("name");
        }
        if params.location.trim().is_empty() {
            fields.push("location");
        }
        if !fields.is_empty() {
            return Err(HotelError::validation(fields));
        }

        self.hotels
            .insert_hotel(Hotel {
                id: String::new(),
                name: params.name,
                location: params.location,
                rooms: Vec::new(),
            })
            .await
    }

    pub async fn list_hotels(&self) -> Result<Vec<Hotel>> {
        self.hotels.list_hotels().await
    }

    /// Insert a room and append its id to the owning hotel
    pub async fn add_room(&self, hotel_id: &str, params: NewRoomParams) -> Result<Room> {
        let mut fields = Vec::new();
        if params.room_type.trim().is_empty() {
            fields.push("type");
        }
        if !params.price.is_finite() || params.price < 0.0 {
            fields.push("price");
        }
        if !fields.is_empty() {
            return Err(HotelError::validation(fields));
        }

        let hotel = self.hotel(hotel_id).await?;

        let room = self
            .rooms
            .insert_room(Room {
                id: String::new(),
                hotel_id: hotel.id.clone(),
                number: params.number,
                floor: params.floor,
                room_type: params.room_type,
                description: params.description,
                price: params.price,
                occupied: params.occupied,
            })
            .await?;

        self.hotels.append_room(&hotel.id, &room.id).await?;
        debug!(hotel_id = %hotel.id, room_id = %room.id, "Room added");

        Ok(room)
    }

    pub async fn list_rooms(&self, hotel_id: &str) -> Result<Vec<Room>> {
        let hotel = self.hotel(hotel_id).await?;
        self.rooms.rooms_for_hotel(&hotel.id).await
    }

    async fn hotel(&self, hotel_id: &str) -> Result<Hotel> {
        self.hotels
            .get_hotel(hotel_id)
            .await?
            .ok_or_else(|| HotelError::not_found("hotel", hotel_id))
    }
}
