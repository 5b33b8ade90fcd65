//! CancelBookingHandler - Command handler for a participant cancelling a booking.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::{AuthenticatedUser, BookingId};
use crate::ports::BookingRepository;

/// Command to cancel a booking.
#[derive(Debug, Clone)]
pub struct CancelBookingCommand {
    pub caller: Option<AuthenticatedUser>,
    pub booking_id: BookingId,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct CancelBookingResult {
    pub booking: Booking,
}

/// Handler for cancellations.
///
/// Only the client or the companion may cancel. Cancelling never refunds;
/// refunds go through the payment handlers.
pub struct CancelBookingHandler {
    bookings: Arc<dyn BookingRepository>,
}

impl CancelBookingHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn handle(&self, cmd: CancelBookingCommand) -> Result<CancelBookingResult, BookingError> {
        let caller = cmd.caller.ok_or(BookingError::NotAuthenticated)?;
        if cmd.reason.trim().is_empty() {
            return Err(BookingError::validation("reason", "must not be empty"));
        }

        let mut booking = self
            .bookings
            .find_by_id(&cmd.booking_id)
            .await?
            .ok_or(BookingError::not_found(cmd.booking_id))?;

        if !booking.is_participant(&caller.id) {
            return Err(BookingError::Forbidden);
        }

        let from = booking.status;
        booking.cancel(Some(caller.id), cmd.reason)?;
        self.bookings.update_lifecycle(&booking, from).await?;

        tracing::info!(booking_id = %booking.id, by = %caller.id, "Booking cancelled");

        Ok(CancelBookingResult { booking })
    }
}
