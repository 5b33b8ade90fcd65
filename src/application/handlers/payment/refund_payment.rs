//! RefundPaymentHandler - Admin command handler for refunding a settled booking.

use std::sync::Arc;

use crate::domain::booking::Booking;
use crate::domain::foundation::{AuthenticatedUser, BookingId, Money};
use crate::domain::payment::PaymentError;
use crate::ports::{BookingRepository, PaymentGateway, Refund, RefundRequest};

/// Command to refund a booking's payment.
#[derive(Debug, Clone)]
pub struct RefundPaymentCommand {
    pub caller: Option<AuthenticatedUser>,
    pub booking_id: BookingId,
    pub amount: Money,
    pub reason: String,
}

/// Result of a successful refund.
#[derive(Debug, Clone)]
pub struct RefundPaymentResult {
    pub refund: Refund,
    pub booking: Booking,
}

/// Handler for refunds.
///
/// A booking is refunded at most once, for an amount in `(0, total_amount]`.
/// The refund cancels the booking regardless of its lifecycle status.
pub struct RefundPaymentHandler {
    bookings: Arc<dyn BookingRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl RefundPaymentHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { bookings, gateway }
    }

    pub async fn handle(&self, cmd: RefundPaymentCommand) -> Result<RefundPaymentResult, PaymentError> {
        let caller = cmd.caller.ok_or(PaymentError::NotAuthenticated)?;
        if !caller.is_admin() {
            return Err(PaymentError::Forbidden);
        }
        if cmd.reason.trim().is_empty() {
            return Err(PaymentError::validation("reason", "must not be empty"));
        }

        let mut booking = self
            .bookings
            .find_by_id(&cmd.booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound(cmd.booking_id))?;

        let payment_intent_id = booking.ensure_refundable(cmd.amount)?.to_string();

        let refund = self
            .gateway
            .create_refund(RefundRequest {
                payment_intent_id,
                amount: cmd.amount,
                reason: cmd.reason.clone(),
                idempotency_key: format!("refund-{}", booking.id),
            })
            .await
            .map_err(|e| {
                tracing::error!(booking_id = %booking.id, code = %e.code, "Refund failed");
                PaymentError::gateway(e.message, e.provider_code)
            })?;

        booking.apply_refund(cmd.reason);
        self.bookings.record_refund(&booking).await?;

        tracing::info!(
            booking_id = %booking.id,
            refund_id = %refund.id,
            amount = %cmd.amount,
            admin_id = %caller.id,
            "Refund issued"
        );

        Ok(RefundPaymentResult { refund, booking })
    }
}
