//! AuthorizePaymentHandler - Command handler for creating a gateway authorization.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::booking::{Booking, PaymentStatus};
use crate::domain::foundation::{BookingId, Money};
use crate::domain::payment::PaymentError;
use crate::ports::{Authorization, AuthorizationRequest, BookingRepository, PaymentGateway};

/// Command to authorize payment for a booking.
#[derive(Debug, Clone)]
pub struct AuthorizePaymentCommand {
    pub booking_id: BookingId,
    pub amount: Money,
    /// Defaults to the configured marketplace currency.
    pub currency: Option<String>,
}

/// Result of a successful authorization.
#[derive(Debug, Clone)]
pub struct AuthorizePaymentResult {
    pub authorization: Authorization,
    /// The booking with the authorization recorded.
    pub booking: Booking,
}

/// Handler for creating payment authorizations.
///
/// The booking id doubles as the gateway idempotency key, so a retried
/// authorization for the same booking returns the original one.
pub struct AuthorizePaymentHandler {
    bookings: Arc<dyn BookingRepository>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl AuthorizePaymentHandler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            bookings,
            gateway,
            currency: currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: AuthorizePaymentCommand,
    ) -> Result<AuthorizePaymentResult, PaymentError> {
        if !cmd.amount.is_positive() {
            return Err(PaymentError::validation("amount", "must be greater than 0"));
        }

        let mut booking = self
            .bookings
            .find_by_id(&cmd.booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound(cmd.booking_id))?;
        if booking.payment_status != PaymentStatus::Pending {
            return Err(PaymentError::Conflict(format!(
                "Payment is already {}",
                booking.payment_status
            )));
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("booking_id".to_string(), booking.id.to_string());
        metadata.insert("client_id".to_string(), booking.client_id.to_string());
        metadata.insert("companion_id".to_string(), booking.companion_id.to_string());

        let authorization = self
            .gateway
            .create_authorization(AuthorizationRequest {
                amount: cmd.amount,
                currency: cmd.currency.unwrap_or_else(|| self.currency.clone()),
                metadata,
                idempotency_key: booking.id.to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!(booking_id = %booking.id, code = %e.code, "Payment authorization failed");
                PaymentError::gateway(e.message, e.provider_code)
            })?;

        self.bookings
            .record_authorization(&booking.id, &authorization.id)
            .await?;
        booking.record_authorization(&authorization.id);

        tracing::info!(
            booking_id = %booking.id,
            authorization_id = %authorization.id,
            amount = %cmd.amount,
            "Payment authorized"
        );

        Ok(AuthorizePaymentResult {
            authorization,
            booking,
        })
    }
}
