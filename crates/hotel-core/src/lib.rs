//! Hotel Core - Domain models, store traits, and booking admission
//!
//! This crate defines the pieces of the reservation backend that do not
//! depend on the HTTP layer:
//! - Domain models (identities, users, hotels, rooms, bookings)
//! - Common error types
//! - Async store traits and their in-memory and PostgreSQL implementations
//! - The booking admission controller and the inventory manager
//! - Configuration management

pub mod admission;
pub mod config;
pub mod inventory;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use admission::{validate_candidate, BookingAdmission};
pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use inventory::InventoryManager;
pub use memory::MemoryStore;
pub use models::{
    Booking, BookingCandidate, BookingStatus, Hotel, Identity, NewHotelParams, NewRoomParams,
    Room, User, UserPublic,
};
pub use postgres::PgStore;
pub use store::{BookingStore, HotelStore, RoomStore, UserStore};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for reservation operations
#[derive(Error, Debug)]
pub enum HotelError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed for: {}", fields.join(", "))]
    ValidationError { fields: Vec<String> },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl HotelError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ValidationError {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HotelError>;
