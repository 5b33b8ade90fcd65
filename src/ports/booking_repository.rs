//! Booking repository port.

use async_trait::async_trait;

use crate::domain::booking::{Booking, BookingStatus, PaymentStatus};
use crate::domain::foundation::{BookingId, DomainError, Money, Timestamp, UserId};

/// Result of settling a payment authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The booking was marked paid and the companion credited.
    Settled {
        booking_id: BookingId,
        companion_id: UserId,
        credited: Money,
    },
    /// The booking was already paid (or refunded); nothing changed.
    AlreadySettled,
    /// No booking references this authorization.
    NoMatchingBooking,
}

impl Settlement {
    pub fn is_settled(&self) -> bool {
        matches!(self, Settlement::Settled { .. })
    }
}

/// Persistence for bookings.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), DomainError>;

    /// Writes the lifecycle fields of `booking` (status, notes and the
    /// cancellation record) if the stored status is still `expected`.
    ///
    /// Payment columns are never touched here; they change only through
    /// `record_authorization`, `record_refund` and `settle_payment`.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the booking does not exist
    /// - `Conflict` if the stored status is no longer `expected`
    async fn update_lifecycle(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<(), DomainError>;

    /// Attaches a payment authorization to a booking whose payment is pending.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the booking does not exist
    /// - `Conflict` if the payment is no longer pending
    async fn record_authorization(
        &self,
        id: &BookingId,
        payment_intent_id: &str,
    ) -> Result<(), DomainError>;

    /// Marks a paid booking refunded and cancelled, keeping `booking`'s
    /// cancellation reason.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the booking does not exist
    /// - `Conflict` if the stored payment is no longer paid
    async fn record_refund(&self, booking: &Booking) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError>;

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Booking>, DomainError>;

    /// Bookings where the user is client or companion, newest start first.
    async fn list_for_participant(&self, user_id: &UserId) -> Result<Vec<Booking>, DomainError>;

    /// Bookings created at or after `since`, optionally filtered by payment status.
    async fn list_created_since(
        &self,
        since: Timestamp,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Vec<Booking>, DomainError>;

    /// Marks the booking behind `payment_intent_id` paid and credits the
    /// companion's earnings, atomically and at most once.
    ///
    /// A pending booking also moves to confirmed.
    async fn settle_payment(&self, payment_intent_id: &str) -> Result<Settlement, DomainError>;
}
