//! Booking aggregate.
//!
//! # Invariants
//!
//! - `total_amount == platform_fee + companion_earnings`, fixed at creation
//! - `end_time == start_time + duration_hours`
//! - status changes follow [`BookingStatus`] transitions; a refund is the only
//!   path that moves a completed booking to cancelled

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BookingId, Money, StateMachine, Timestamp, UserId, ValidationError,
};
use crate::domain::profile::ParticipantSummary;

use super::{BookingError, BookingStatus, DurationHours, FeeSplit, PaymentStatus};

/// Cancellation reason recorded when the payment authorization fails.
pub const AUTHORIZATION_FAILED_REASON: &str = "payment authorization failed";

/// Everything the client supplies when requesting a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub client_id: UserId,
    pub companion_id: UserId,
    pub start_time: Timestamp,
    pub duration: DurationHours,
    pub service_type: String,
    pub location: Option<String>,
    pub special_requests: Option<String>,
}

/// A reservation of a companion's time by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub client_id: UserId,
    pub companion_id: UserId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub duration_hours: DurationHours,
    pub service_type: String,
    pub location: Option<String>,
    pub special_requests: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Gateway authorization id, once one has been created.
    pub payment_intent_id: Option<String>,
    pub total_amount: Money,
    pub platform_fee: Money,
    pub companion_earnings: Money,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    /// Creates a pending booking priced from the companion's hourly rate.
    pub fn create(request: BookingRequest, hourly_rate: Money) -> Result<Self, BookingError> {
        if request.service_type.trim().is_empty() {
            return Err(ValidationError::empty_field("service_type").into());
        }
        if request.client_id == request.companion_id {
            return Err(BookingError::validation(
                "companion_id",
                "cannot book yourself",
            ));
        }
        let split = FeeSplit::for_booking(hourly_rate, request.duration)?;
        let now = Timestamp::now();

        Ok(Self {
            id: BookingId::new(),
            client_id: request.client_id,
            companion_id: request.companion_id,
            start_time: request.start_time,
            end_time: request
                .start_time
                .plus_hours(i64::from(request.duration.value())),
            duration_hours: request.duration,
            service_type: request.service_type,
            location: request.location,
            special_requests: request.special_requests,
            notes: None,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            total_amount: split.total,
            platform_fee: split.platform_fee,
            companion_earnings: split.companion_earnings,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// True when the user is the client or the companion.
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.client_id == *user_id || self.companion_id == *user_id
    }

    /// Moves to a new status, storing notes when given.
    pub fn update_status(
        &mut self,
        target: BookingStatus,
        notes: Option<String>,
    ) -> Result<(), BookingError> {
        self.status = self.status.transition_to(target)?;
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cancels the booking on behalf of `by`.
    pub fn cancel(
        &mut self,
        by: Option<UserId>,
        reason: impl Into<String>,
    ) -> Result<(), BookingError> {
        self.status = self.status.transition_to(BookingStatus::Cancelled)?;
        let now = Timestamp::now();
        self.cancellation_reason = Some(reason.into());
        self.cancelled_by = by;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Records the gateway authorization created for this booking.
    pub fn record_authorization(&mut self, payment_intent_id: impl Into<String>) {
        self.payment_intent_id = Some(payment_intent_id.into());
        self.payment_status = PaymentStatus::Pending;
        self.updated_at = Timestamp::now();
    }

    /// Marks the payment settled; returns false if it already was.
    pub fn settle_payment(&mut self) -> bool {
        if self.payment_status != PaymentStatus::Pending {
            return false;
        }
        self.payment_status = PaymentStatus::Paid;
        if self.status == BookingStatus::Pending {
            self.status = BookingStatus::Confirmed;
        }
        self.updated_at = Timestamp::now();
        true
    }

    /// Checks that a refund of `amount` may be issued.
    pub fn ensure_refundable(&self, amount: Money) -> Result<&str, BookingError> {
        let intent = self
            .payment_intent_id
            .as_deref()
            .ok_or(BookingError::NoPaymentReference(self.id))?;
        if self.payment_status != PaymentStatus::Paid {
            return Err(BookingError::NotRefundable {
                payment_status: self.payment_status,
            });
        }
        if !amount.is_positive() || amount > self.total_amount {
            return Err(BookingError::InvalidRefundAmount {
                amount,
                max: self.total_amount,
            });
        }
        Ok(intent)
    }

    /// Marks the payment refunded and cancels the booking with `reason`.
    pub fn apply_refund(&mut self, reason: impl Into<String>) {
        let now = Timestamp::now();
        self.payment_status = PaymentStatus::Refunded;
        self.status = BookingStatus::Cancelled;
        self.cancellation_reason = Some(reason.into());
        if self.cancelled_at.is_none() {
            self.cancelled_at = Some(now);
        }
        self.updated_at = now;
    }
}

/// Booking joined with both parties' display profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWithParties {
    pub booking: Booking,
    pub client: Option<ParticipantSummary>,
    pub companion: Option<ParticipantSummary>,
}
