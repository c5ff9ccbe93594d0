//! Application state management

use crate::auth::{AccountService, TokenAuthority};
use crate::error::AppError;
use hotel_core::config::AppConfig;
use hotel_core::{
    BookingAdmission, BookingStore, HotelStore, InventoryManager, MemoryStore, RoomStore,
    UserPublic, UserStore,
};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
///
/// Everything here is read-only after startup; the stores synchronize
/// internally.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Token signing and verification
    pub tokens: Arc<TokenAuthority>,
    /// Registration and login
    pub accounts: AccountService,
    /// Booking admission and cancellation
    pub bookings: BookingAdmission,
    /// Hotel and room inventory
    pub inventory: InventoryManager,
}

impl AppState {
    /// Build state over a single store that implements every store trait
    pub fn new<S>(config: AppConfig, store: Arc<S>) -> Self
    where
        S: UserStore + HotelStore + RoomStore + BookingStore + 'static,
    {
        let tokens = Arc::new(TokenAuthority::from_config(&config.auth));

        Self {
            accounts: AccountService::new(store.clone(), tokens.clone()),
            bookings: BookingAdmission::new(store.clone(), store.clone()),
            inventory: InventoryManager::new(store.clone(), store),
            tokens,
            config,
            start_time: Instant::now(),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Create or promote the administrator named in `auth.admin_email`
    ///
    /// Returns `None` when no bootstrap credentials are configured.
    pub async fn ensure_bootstrap_admin(&self) -> Result<Option<UserPublic>, AppError> {
        let Some((email, password)) = self.config.auth.bootstrap_admin() else {
            return Ok(None);
        };
        let admin = self.accounts.ensure_bootstrap_admin(email, password).await?;
        Ok(Some(admin))
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
