//! CreateBookingHandler - Command handler for reserving a companion.

use std::sync::Arc;

use crate::application::handlers::payment::{AuthorizePaymentCommand, AuthorizePaymentHandler};
use crate::domain::booking::{
    Booking, BookingError, BookingRequest, DurationHours, AUTHORIZATION_FAILED_REASON,
};
use crate::domain::foundation::{AuthenticatedUser, Timestamp, UserId};
use crate::ports::{BookingRepository, ProfileRepository};

/// Command to create a booking.
#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    pub caller: Option<AuthenticatedUser>,
    pub companion_id: UserId,
    pub start_time: Timestamp,
    pub duration_hours: u32,
    pub service_type: String,
    pub location: Option<String>,
    pub special_requests: Option<String>,
}

/// Result of a successful booking creation.
#[derive(Debug, Clone)]
pub struct CreateBookingResult {
    /// Pending booking with its authorization recorded.
    pub booking: Booking,
    /// Secret the client uses to complete payment.
    pub client_secret: Option<String>,
}

/// Handler for creating bookings.
///
/// Persists a pending booking, then authorizes payment for its total. When
/// authorization fails the booking is cancelled with
/// [`AUTHORIZATION_FAILED_REASON`] and the gateway's error is returned.
pub struct CreateBookingHandler {
    profiles: Arc<dyn ProfileRepository>,
    bookings: Arc<dyn BookingRepository>,
    authorize: Arc<AuthorizePaymentHandler>,
}

impl CreateBookingHandler {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        bookings: Arc<dyn BookingRepository>,
        authorize: Arc<AuthorizePaymentHandler>,
    ) -> Self {
        Self {
            profiles,
            bookings,
            authorize,
        }
    }

    pub async fn handle(&self, cmd: CreateBookingCommand) -> Result<CreateBookingResult, BookingError> {
        let caller = cmd.caller.ok_or(BookingError::NotAuthenticated)?;
        let duration = DurationHours::try_new(cmd.duration_hours)?;

        let hourly_rate = self
            .profiles
            .companion_rate(&cmd.companion_id)
            .await?
            .ok_or(BookingError::CompanionNotFound(cmd.companion_id))?;

        let mut booking = Booking::create(
            BookingRequest {
                client_id: caller.id,
                companion_id: cmd.companion_id,
                start_time: cmd.start_time,
                duration,
                service_type: cmd.service_type,
                location: cmd.location,
                special_requests: cmd.special_requests,
            },
            hourly_rate,
        )?;
        self.bookings.insert(&booking).await?;

        tracing::info!(
            booking_id = %booking.id,
            client_id = %booking.client_id,
            companion_id = %booking.companion_id,
            total = %booking.total_amount,
            "Booking created"
        );

        let authorized = self
            .authorize
            .handle(AuthorizePaymentCommand {
                booking_id: booking.id,
                amount: booking.total_amount,
                currency: None,
            })
            .await;

        match authorized {
            Ok(result) => Ok(CreateBookingResult {
                client_secret: result.authorization.client_secret,
                booking: result.booking,
            }),
            Err(err) => {
                let from = booking.status;
                booking.cancel(None, AUTHORIZATION_FAILED_REASON)?;
                if let Err(update_err) = self.bookings.update_lifecycle(&booking, from).await {
                    tracing::error!(
                        booking_id = %booking.id,
                        error = %update_err,
                        "Failed to cancel booking after authorization failure"
                    );
                }
                tracing::warn!(
                    booking_id = %booking.id,
                    error = %err,
                    "Booking cancelled: payment authorization failed"
                );
                Err(BookingError::payment_failed(err.message()))
            }
        }
    }
}
