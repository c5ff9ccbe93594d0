//! Domain models for the reservation backend
//!
//! - Identity: the authenticated principal resolved from a bearer token
//! - User: account record (password hash stays server-side)
//! - Hotel / Room: inventory referenced by bookings
//! - Booking: a stay recorded for exactly one owner

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Authenticated principal
///
/// Built only from a verified token claim set and passed explicitly to
/// every operation that needs to know who is calling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User identifier
    pub id: String,
    /// Whether the principal holds admin rights
    pub is_admin: bool,
}

impl Identity {
    pub fn new(id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id: id.into(),
            is_admin,
        }
    }

    /// Regular (non-admin) identity
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(id, false)
    }

    /// Admin identity
    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, true)
    }

    /// Owner or admin
    pub fn can_act_for(&self, owner_id: &str) -> bool {
        self.is_admin || self.id == owner_id
    }
}

/// User account model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Login email (unique)
    pub email: String,
    /// Argon2id PHC string, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user; the id is assigned by the store on insert
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        is_admin: bool,
    ) -> Self {
        Self {
            id: String::new(),
            first_name,
            last_name,
            email,
            password_hash,
            is_admin,
            created_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.is_admin)
    }

    /// Convert user to public representation (without the password hash)
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
        }
    }
}

/// Public user representation (safe for API responses)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Hotel inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    /// Identifiers of the rooms belonging to this hotel
    #[serde(default)]
    pub rooms: Vec<String>,
}

/// Hotel creation parameters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewHotelParams {
    pub name: String,
    pub location: String,
}

/// Room inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    pub number: i32,
    pub floor: i32,
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub occupied: bool,
}

/// Room creation parameters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewRoomParams {
    pub number: i32,
    pub floor: i32,
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub occupied: bool,
}

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Active,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// Booking request body as sent by a client
///
/// `user_id` is accepted so that older clients keep deserializing, but it is
/// never used: the owner is always the authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingCandidate {
    pub room_id: String,
    pub from_date: NaiveDate,
    pub till_date: NaiveDate,
    #[serde(default = "default_num_persons")]
    pub num_persons: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_num_persons() -> u32 {
    1
}

/// Recorded booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    /// Store-assigned identifier
    pub id: String,
    /// Owner, always taken from the verified token
    pub user_id: String,
    pub room_id: String,
    pub from_date: NaiveDate,
    pub till_date: NaiveDate,
    pub num_persons: u32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Bind an already validated candidate to its owner
    pub fn from_candidate(candidate: BookingCandidate, owner: &Identity) -> Self {
        Self {
            id: String::new(),
            user_id: owner.id.clone(),
            room_id: candidate.room_id,
            from_date: candidate.from_date,
            till_date: candidate.till_date,
            num_persons: candidate.num_persons,
            status: BookingStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}
