//! PostgreSQL store
//!
//! Implements the store traits using SQLx. Identifiers are generated here
//! as UUID strings so records keep the same shape as the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Hotel, Room, User};
use crate::store::{BookingStore, HotelStore, RoomStore, UserStore};
use crate::{HotelError, Result};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        is_admin BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hotels (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        location TEXT NOT NULL,
        rooms TEXT[] NOT NULL DEFAULT '{}'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id TEXT PRIMARY KEY,
        hotel_id TEXT NOT NULL REFERENCES hotels(id),
        number INTEGER NOT NULL,
        floor INTEGER NOT NULL,
        room_type TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        price DOUBLE PRECISION NOT NULL,
        occupied BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id),
        room_id TEXT NOT NULL REFERENCES rooms(id),
        from_date DATE NOT NULL,
        till_date DATE NOT NULL,
        num_persons INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (from_date < till_date)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS bookings_user_id_idx ON bookings (user_id)",
    "CREATE INDEX IF NOT EXISTS rooms_hotel_id_idx ON rooms (hotel_id)",
];

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| HotelError::StorageError(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| storage("Failed to apply schema", e))?;
        }
        Ok(())
    }
}

fn storage(context: &str, err: sqlx::Error) -> HotelError {
    HotelError::StorageError(format!("{context}: {err}"))
}

fn new_id(id: &str) -> String {
    if id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct HotelRow {
    id: String,
    name: String,
    location: String,
    rooms: Vec<String>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            location: row.location,
            rooms: row.rooms,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoomRow {
    id: String,
    hotel_id: String,
    number: i32,
    floor: i32,
    room_type: String,
    description: String,
    price: f64,
    occupied: bool,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            hotel_id: row.hotel_id,
            number: row.number,
            floor: row.floor,
            room_type: row.room_type,
            description: row.description,
            price: row.price,
            occupied: row.occupied,
        }
    }
}

#[derive(Debug, FromRow)]
struct BookingRow {
    id: String,
    user_id: String,
    room_id: String,
    from_date: NaiveDate,
    till_date: NaiveDate,
    num_persons: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = HotelError;

    fn try_from(row: BookingRow) -> Result<Self> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(HotelError::StorageError)?;
        let num_persons = u32::try_from(row.num_persons).map_err(|_| {
            HotelError::StorageError(format!(
                "booking {} has invalid guest count {}",
                row.id, row.num_persons
            ))
        })?;

        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            room_id: row.room_id,
            from_date: row.from_date,
            till_date: row.till_date,
            num_persons,
            status,
            created_at: row.created_at,
        })
    }
}

fn guest_count(booking: &Booking) -> Result<i32> {
    i32::try_from(booking.num_persons)
        .map_err(|_| HotelError::validation(["num_persons"]))
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, first_name, last_name, email, password_hash, is_admin, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage("Failed to get user", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, first_name, last_name, email, password_hash, is_admin, created_at FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage("Failed to find user", e))?;

        Ok(row.map(User::from))
    }

    async fn insert_user(&self, user: User) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, first_name, last_name, email, password_hash, is_admin, created_at
            "#,
        )
        .bind(new_id(&user.id))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                HotelError::Conflict(format!("email {} is already registered", user.email))
            }
            other => storage("Failed to create user", other),
        })?;

        Ok(row.into())
    }

    async fn list_users(&self, limit: usize, offset: usize) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, password_hash, is_admin, created_at
            FROM users
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage("Failed to list users", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, password_hash = $5, is_admin = $6
            WHERE id = $1
            "#,
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                HotelError::Conflict(format!("email {} is already registered", user.email))
            }
            other => storage("Failed to update user", other),
        })?;

        if result.rows_affected() == 0 {
            return Err(HotelError::not_found("user", user.id.clone()));
        }
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    HotelError::Conflict(format!("user {id} still has bookings"))
                }
                other => storage("Failed to delete user", other),
            })?;

        if result.rows_affected() == 0 {
            return Err(HotelError::not_found("user", id));
        }
        Ok(())
    }
}

#[async_trait]
impl HotelStore for PgStore {
    async fn get_hotel(&self, id: &str) -> Result<Option<Hotel>> {
        let row: Option<HotelRow> =
            sqlx::query_as("SELECT id, name, location, rooms FROM hotels WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage("Failed to get hotel", e))?;

        Ok(row.map(Hotel::from))
    }

    async fn list_hotels(&self) -> Result<Vec<Hotel>> {
        let rows: Vec<HotelRow> =
            sqlx::query_as("SELECT id, name, location, rooms FROM hotels ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| storage("Failed to list hotels", e))?;

        Ok(rows.into_iter().map(Hotel::from).collect())
    }

    async fn insert_hotel(&self, hotel: Hotel) -> Result<Hotel> {
        let row: HotelRow = sqlx::query_as(
            "INSERT INTO hotels (id, name, location, rooms) VALUES ($1, $2, $3, $4) RETURNING id, name, location, rooms",
        )
        .bind(new_id(&hotel.id))
        .bind(&hotel.name)
        .bind(&hotel.location)
        .bind(&hotel.rooms)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage("Failed to create hotel", e))?;

        Ok(row.into())
    }

    async fn append_room(&self, hotel_id: &str, room_id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE hotels SET rooms = array_append(rooms, $2) WHERE id = $1")
            .bind(hotel_id)
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage("Failed to add room to hotel", e))?;

        if result.rows_affected() == 0 {
            return Err(HotelError::not_found("hotel", hotel_id));
        }
        Ok(())
    }
}

#[async_trait]
impl RoomStore for PgStore {
    async fn get_room(&self, id: &str) -> Result<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as(
            "SELECT id, hotel_id, number, floor, room_type, description, price, occupied FROM rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage("Failed to get room", e))?;

        Ok(row.map(Room::from))
    }

    async fn rooms_for_hotel(&self, hotel_id: &str) -> Result<Vec<Room>> {
        let rows: Vec<RoomRow> = sqlx::query_as(
            r#"
            SELECT id, hotel_id, number, floor, room_type, description, price, occupied
            FROM rooms
            WHERE hotel_id = $1
            ORDER BY floor, number
            "#,
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage("Failed to list rooms", e))?;

        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn insert_room(&self, room: Room) -> Result<Room> {
        let row: RoomRow = sqlx::query_as(
            r#"
            INSERT INTO rooms (id, hotel_id, number, floor, room_type, description, price, occupied)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, hotel_id, number, floor, room_type, description, price, occupied
            "#,
        )
        .bind(new_id(&room.id))
        .bind(&room.hotel_id)
        .bind(room.number)
        .bind(room.floor)
        .bind(&room.room_type)
        .bind(&room.description)
        .bind(room.price)
        .bind(room.occupied)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage("Failed to create room", e))?;

        Ok(row.into())
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, room_id, from_date, till_date, num_persons, status, created_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage("Failed to get booking", e))?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(&self, owner_id: Option<&str>) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, room_id, from_date, till_date, num_persons, status, created_at
            FROM bookings
            WHERE $1::TEXT IS NULL OR user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage("Failed to list bookings", e))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn insert_booking(&self, booking: Booking) -> Result<Booking> {
        let row: BookingRow = sqlx::query_as(
            r#"
            INSERT INTO bookings (id, user_id, room_id, from_date, till_date, num_persons, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, room_id, from_date, till_date, num_persons, status, created_at
            "#,
        )
        .bind(new_id(&booking.id))
        .bind(&booking.user_id)
        .bind(&booking.room_id)
        .bind(booking.from_date)
        .bind(booking.till_date)
        .bind(guest_count(&booking)?)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage("Failed to create booking", e))?;

        row.try_into()
    }

    async fn update_booking(&self, booking: &Booking) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET room_id = $2, from_date = $3, till_date = $4, num_persons = $5, status = $6
            WHERE id = $1
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.room_id)
        .bind(booking.from_date)
        .bind(booking.till_date)
        .bind(guest_count(booking)?)
        .bind(booking.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| storage("Failed to update booking", e))?;

        if result.rows_affected() == 0 {
            return Err(HotelError::not_found("booking", booking.id.clone()));
        }
        Ok(())
    }
}
