//! UpdateBookingStatusHandler - Command handler for moving a booking through its lifecycle.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError, BookingStatus};
use crate::domain::foundation::{AuthenticatedUser, BookingId};
use crate::ports::BookingRepository;

/// Command to change a booking's status.
#[derive(Debug, Clone)]
pub struct UpdateBookingStatusCommand {
    pub caller: Option<AuthenticatedUser>,
    pub booking_id: BookingId,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateBookingStatusResult {
    pub booking: Booking,
}

/// Handler for status changes by a participant or an admin.
pub struct UpdateBookingStatusHandler {
    bookings: Arc<dyn BookingRepository>,
}

impl UpdateBookingStatusHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn handle(
        &self,
        cmd: UpdateBookingStatusCommand,
    ) -> Result<UpdateBookingStatusResult, BookingError> {
        let caller = cmd.caller.ok_or(BookingError::NotAuthenticated)?;

        let mut booking = self
            .bookings
            .find_by_id(&cmd.booking_id)
            .await?
            .ok_or(BookingError::not_found(cmd.booking_id))?;

        if !booking.is_participant(&caller.id) && !caller.is_admin() {
            return Err(BookingError::Forbidden);
        }

        let from = booking.status;
        booking.update_status(cmd.status, cmd.notes)?;
        self.bookings.update_lifecycle(&booking, from).await?;

        tracing::info!(
            booking_id = %booking.id,
            from = %from,
            to = %booking.status,
            by = %caller.id,
            "Booking status updated"
        );

        Ok(UpdateBookingStatusResult { booking })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::booking::{BookingRequest, DurationHours};
    use crate::domain::foundation::{Money, Timestamp, UserId, UserType};

    async fn setup() -> (InMemoryStore, UpdateBookingStatusHandler, Booking) {
        let store = InMemoryStore::new();
        let client = store.seed_client("client@example.com");
        let companion = store.seed_companion("companion@example.com", Money::from_cents(2_000));
        let booking = Booking::create(
            BookingRequest {
                client_id: client,
                companion_id: companion,
                start_time: Timestamp::now().plus_hours(3),
                duration: DurationHours::try_new(2).unwrap(),
                service_type: "gallery".to_string(),
                location: None,
                special_requests: None,
            },
            Money::from_cents(2_000),
        )
        .unwrap();
        BookingRepository::insert(&store, &booking).await.unwrap();
        let handler = UpdateBookingStatusHandler::new(Arc::new(store.clone()));
        (store, handler, booking)
    }

    fn user(id: UserId, user_type: UserType) -> Option<AuthenticatedUser> {
        Some(AuthenticatedUser::new(id, "user@example.com", user_type))
    }

    #[tokio::test]
    async fn companion_confirms_with_notes() {
        let (store, handler, booking) = setup().await;

        let result = handler
            .handle(UpdateBookingStatusCommand {
                caller: user(booking.companion_id, UserType::Companion),
                booking_id: booking.id,
                status: BookingStatus::Confirmed,
                notes: Some("Looking forward to it".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.booking.status, BookingStatus::Confirmed);
        let stored = store.booking(&booking.id).unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert_eq!(stored.notes.as_deref(), Some("Looking forward to it"));
    }

    #[tokio::test]
    async fn admin_may_update_any_booking() {
        let (_store, handler, booking) = setup().await;

        let result = handler
            .handle(UpdateBookingStatusCommand {
                caller: user(UserId::new(), UserType::Admin),
                booking_id: booking.id,
                status: BookingStatus::Cancelled,
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(result.booking.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn outsider_is_forbidden() {
        let (store, handler, booking) = setup().await;

        let err = handler
            .handle(UpdateBookingStatusCommand {
                caller: user(UserId::new(), UserType::Client),
                booking_id: booking.id,
                status: BookingStatus::Confirmed,
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err, BookingError::Forbidden);
        assert_eq!(store.booking(&booking.id).unwrap().status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let (store, handler, booking) = setup().await;

        let err = handler
            .handle(UpdateBookingStatusCommand {
                caller: user(booking.client_id, UserType::Client),
                booking_id: booking.id,
                status: BookingStatus::Completed,
                notes: Some("done".to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BookingError::InvalidTransition {
                from: "pending".to_string(),
                to: "completed".to_string()
            }
        );
        assert!(store.booking(&booking.id).unwrap().notes.is_none());
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let (_store, handler, _booking) = setup().await;
        let missing = BookingId::new();

        let err = handler
            .handle(UpdateBookingStatusCommand {
                caller: user(UserId::new(), UserType::Admin),
                booking_id: missing,
                status: BookingStatus::Confirmed,
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err, BookingError::NotFound(missing));
    }
}
