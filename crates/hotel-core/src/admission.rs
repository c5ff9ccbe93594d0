//! Booking admission controller
//!
//! Every booking passes through [`BookingAdmission`] before it is recorded.
//! The owner of a booking is always the identity resolved from the caller's
//! verified token; any owner supplied in the request body is discarded.

use std::sync::Arc;

use tracing::debug;

use crate::models::{Booking, BookingCandidate, BookingStatus, Identity};
use crate::store::{BookingStore, RoomStore};
use crate::{HotelError, Result};

/// Structural checks on a candidate booking
///
/// Returns `ValidationError` listing every violated field.
pub fn validate_candidate(candidate: &BookingCandidate) -> Result<()> {
    let mut fields = Vec::new();

    if candidate.room_id.trim().is_empty() {
        fields.push("room_id");
    }
    if candidate.from_date >= candidate.till_date {
        fields.push("till_date");
    }
    if candidate.num_persons == 0 {
        fields.push("num_persons");
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(HotelError::validation(fields))
    }
}

/// Admits, reads and cancels bookings on behalf of an authenticated identity
#[derive(Clone)]
pub struct BookingAdmission {
    rooms: Arc<dyn RoomStore>,
    bookings: Arc<dyn BookingStore>,
}

impl BookingAdmission {
    pub fn new(rooms: Arc<dyn RoomStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { rooms, bookings }
    }

    /// Validate a candidate, bind it to `identity`, and record it
    ///
    /// # Errors
    ///
    /// * `ValidationError` - malformed interval, empty room reference, or zero guests
    /// * `NotFound` - the referenced room does not exist
    /// * `StorageError` - the store failed; not retried here
    pub async fn admit(&self, candidate: BookingCandidate, identity: &Identity) -> Result<Booking> {
        validate_candidate(&candidate)?;

        if let Some(claimed) = candidate.user_id.as_deref() {
            if claimed != identity.id {
                debug!(
                    claimed_owner = %claimed,
                    user_id = %identity.id,
                    "Discarding client-supplied booking owner"
                );
            }
        }

        let booking = Booking::from_candidate(candidate, identity);

        if self.rooms.get_room(&booking.room_id).await?.is_none() {
            return Err(HotelError::not_found("room", booking.room_id));
        }

        let stored = self.bookings.insert_booking(booking).await?;
        debug!(booking_id = %stored.id, user_id = %stored.user_id, "Booking admitted");

        Ok(stored)
    }

    /// Fetch a booking visible to `identity`
    pub async fn get(&self, booking_id: &str, identity: &Identity) -> Result<Booking> {
        let booking = self.find(booking_id).await?;
        ensure_access(&booking, identity)?;
        Ok(booking)
    }

    /// Admins see every booking; everyone else sees their own
    pub async fn list(&self, identity: &Identity) -> Result<Vec<Booking>> {
        let owner = if identity.is_admin {
            None
        } else {
            Some(identity.id.as_str())
        };
        self.bookings.list_bookings(owner).await
    }

    /// Cancel a booking owned by `identity` (or any booking, for an admin)
    ///
    /// Cancelling an already cancelled booking returns it unchanged.
    pub async fn cancel(&self, booking_id: &str, identity: &Identity) -> Result<Booking> {
        let mut booking = self.find(booking_id).await?;
        ensure_access(&booking, identity)?;

        if booking.is_cancelled() {
            return Ok(booking);
        }

        booking.status = BookingStatus::Cancelled;
        self.bookings.update_booking(&booking).await?;
        debug!(booking_id = %booking.id, cancelled_by = %identity.id, "Booking cancelled");

        Ok(booking)
    }

    async fn find(&self, booking_id: &str) -> Result<Booking> {
        self.bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| HotelError::not_found("booking", booking_id))
    }
}

fn ensure_access(booking: &Booking, identity: &Identity) -> Result<()> {
    if identity.can_act_for(&booking.user_id) {
        Ok(())
    } else {
        Err(HotelError::Forbidden(format!(
            "booking {} belongs to another user",
            booking.id
        )))
    }
}
