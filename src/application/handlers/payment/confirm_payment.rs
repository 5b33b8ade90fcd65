//! ConfirmPaymentHandler - Command handler for settling a succeeded authorization.

use std::sync::Arc;

use crate::domain::payment::PaymentError;
use crate::ports::{Authorization, BookingRepository, PaymentGateway, Settlement};

/// Command to confirm an authorization after the client completed payment.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub authorization_id: String,
}

/// Result of a confirmation attempt.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentResult {
    /// Authorization as the gateway currently reports it.
    pub authorization: Authorization,
    /// True only for the call that actually settled the booking.
    pub settled: bool,
}

/// Handler for confirming payments.
///
/// Settlement happens only when the gateway reports `succeeded`. Marking the
/// booking paid and crediting the companion is a single repository operation
/// that runs at most once per booking, so repeated confirmations (client
/// retries, webhook redelivery) never double-credit.
pub struct ConfirmPaymentHandler {
    bookings: Arc<dyn BookingRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl ConfirmPaymentHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { bookings, gateway }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPaymentCommand,
    ) -> Result<ConfirmPaymentResult, PaymentError> {
        if cmd.authorization_id.trim().is_empty() {
            return Err(PaymentError::validation("authorization_id", "must not be empty"));
        }

        let authorization = self
            .gateway
            .retrieve_authorization(&cmd.authorization_id)
            .await
            .map_err(|e| PaymentError::gateway(e.message, e.provider_code))?;

        if !authorization.status.is_succeeded() {
            tracing::debug!(
                authorization_id = %authorization.id,
                status = %authorization.status,
                "Authorization not succeeded, nothing to settle"
            );
            return Ok(ConfirmPaymentResult {
                authorization,
                settled: false,
            });
        }

        let settled = match self.bookings.settle_payment(&authorization.id).await? {
            Settlement::Settled {
                booking_id,
                companion_id,
                credited,
            } => {
                tracing::info!(
                    booking_id = %booking_id,
                    companion_id = %companion_id,
                    credited = %credited,
                    "Payment settled"
                );
                true
            }
            Settlement::AlreadySettled => false,
            Settlement::NoMatchingBooking => {
                tracing::warn!(
                    authorization_id = %authorization.id,
                    "Succeeded authorization has no matching booking"
                );
                false
            }
        };

        Ok(ConfirmPaymentResult {
            authorization,
            settled,
        })
    }
}
