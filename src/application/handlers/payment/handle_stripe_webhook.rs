//! HandleStripeWebhookHandler - Command handler for Stripe webhook deliveries.

use std::sync::Arc;

use crate::domain::payment::{PaymentError, PaymentIntentObject, StripeEventType, StripeWebhookVerifier};

use super::{ConfirmPaymentCommand, ConfirmPaymentHandler};

/// Command carrying a raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Raw request body, verified byte for byte.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// Outcome of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleStripeWebhookResult {
    /// `payment_intent.succeeded` was run through confirmation.
    Confirmed {
        authorization_id: String,
        settled: bool,
    },
    /// A known event that needs no action.
    Acknowledged,
    /// An event type this service does not act on.
    Ignored,
}

/// Handler for Stripe webhooks.
///
/// Every delivery is authenticated against the signing secret before its
/// payload is trusted. Settlement reuses [`ConfirmPaymentHandler`], so a
/// redelivered event is harmless.
pub struct HandleStripeWebhookHandler {
    verifier: StripeWebhookVerifier,
    confirm: Arc<ConfirmPaymentHandler>,
    require_livemode: bool,
}

impl HandleStripeWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        confirm: Arc<ConfirmPaymentHandler>,
        require_livemode: bool,
    ) -> Self {
        Self {
            verifier,
            confirm,
            require_livemode,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<HandleStripeWebhookResult, PaymentError> {
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &cmd.signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected Stripe webhook");
                PaymentError::from(e)
            })?;

        if self.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Ignoring test-mode webhook event");
            return Ok(HandleStripeWebhookResult::Ignored);
        }

        match event.parsed_type() {
            StripeEventType::PaymentIntentSucceeded => {
                let intent: PaymentIntentObject = event.deserialize_object().map_err(|e| {
                    PaymentError::validation("data.object", format!("not a payment intent: {}", e))
                })?;
                let result = self
                    .confirm
                    .handle(ConfirmPaymentCommand {
                        authorization_id: intent.id,
                    })
                    .await?;
                Ok(HandleStripeWebhookResult::Confirmed {
                    authorization_id: result.authorization.id,
                    settled: result.settled,
                })
            }
            StripeEventType::PaymentIntentFailed => {
                tracing::info!(event_id = %event.id, "Payment intent failed");
                Ok(HandleStripeWebhookResult::Acknowledged)
            }
            StripeEventType::Unknown => {
                tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
                Ok(HandleStripeWebhookResult::Ignored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentGateway;
    use crate::application::handlers::payment::{AuthorizePaymentCommand, AuthorizePaymentHandler};
    use crate::domain::booking::{Booking, BookingRequest, DurationHours, PaymentStatus};
    use crate::domain::foundation::{Money, Timestamp};
    use crate::domain::payment::{sign_for_test, WebhookError};
    use crate::ports::{AuthorizationStatus, BookingRepository};

    const SECRET: &str = "whsec_test_secret";

    struct Fixture {
        store: InMemoryStore,
        gateway: MockPaymentGateway,
        handler: HandleStripeWebhookHandler,
    }

    fn fixture(require_livemode: bool) -> Fixture {
        let store = InMemoryStore::new();
        let gateway = MockPaymentGateway::new();
        let confirm = Arc::new(ConfirmPaymentHandler::new(
            Arc::new(store.clone()),
            Arc::new(gateway.clone()),
        ));
        let handler = HandleStripeWebhookHandler::new(
            StripeWebhookVerifier::new(SECRET),
            confirm,
            require_livemode,
        );
        Fixture {
            store,
            gateway,
            handler,
        }
    }

    fn event_json(event_type: &str, intent_id: &str, livemode: bool) -> String {
        serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "livemode": livemode,
            "data": {"object": {"id": intent_id, "status": "succeeded", "metadata": {}}}
        })
        .to_string()
    }

    fn signed(payload: &str) -> HandleStripeWebhookCommand {
        HandleStripeWebhookCommand {
            payload: payload.as_bytes().to_vec(),
            signature: sign_for_test(SECRET, chrono::Utc::now().timestamp(), payload),
        }
    }

    async fn authorized(f: &Fixture) -> (Booking, String) {
        let client = f.store.seed_client("client@example.com");
        let companion = f.store.seed_companion("companion@example.com", Money::from_cents(6_000));
        let booking = Booking::create(
            BookingRequest {
                client_id: client,
                companion_id: companion,
                start_time: Timestamp::now().plus_hours(2),
                duration: DurationHours::try_new(2).unwrap(),
                service_type: "walk".to_string(),
                location: None,
                special_requests: None,
            },
            Money::from_cents(6_000),
        )
        .unwrap();
        BookingRepository::insert(&f.store, &booking).await.unwrap();
        let result = AuthorizePaymentHandler::new(
            Arc::new(f.store.clone()),
            Arc::new(f.gateway.clone()),
            "usd",
        )
        .handle(AuthorizePaymentCommand {
            booking_id: booking.id,
            amount: booking.total_amount,
            currency: None,
        })
        .await
        .unwrap();
        (booking, result.authorization.id)
    }

    #[tokio::test]
    async fn succeeded_event_settles_booking() {
        let f = fixture(false);
        let (booking, intent) = authorized(&f).await;
        f.gateway.set_status(&intent, AuthorizationStatus::Succeeded);

        let payload = event_json("payment_intent.succeeded", &intent, false);
        let result = f.handler.handle(signed(&payload)).await.unwrap();

        assert_eq!(
            result,
            HandleStripeWebhookResult::Confirmed {
                authorization_id: intent.clone(),
                settled: true
            }
        );
        assert_eq!(f.store.booking(&booking.id).unwrap().payment_status, PaymentStatus::Paid);

        let redelivered = f.handler.handle(signed(&payload)).await.unwrap();
        assert_eq!(
            redelivered,
            HandleStripeWebhookResult::Confirmed {
                authorization_id: intent,
                settled: false
            }
        );
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let f = fixture(false);
        let payload = event_json("payment_intent.succeeded", "pi_1", false);

        let err = f
            .handler
            .handle(HandleStripeWebhookCommand {
                payload: payload.into_bytes(),
                signature: sign_for_test("whsec_other", chrono::Utc::now().timestamp(), "{}"),
            })
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::InvalidWebhook(WebhookError::InvalidSignature));
        assert!(!f.gateway.was_called("retrieve_authorization"));
    }

    #[tokio::test]
    async fn unrelated_events_are_ignored() {
        let f = fixture(false);
        let payload = event_json("customer.created", "cus_1", false);

        let result = f.handler.handle(signed(&payload)).await.unwrap();

        assert_eq!(result, HandleStripeWebhookResult::Ignored);
    }

    #[tokio::test]
    async fn failed_intent_is_acknowledged() {
        let f = fixture(false);
        let payload = event_json("payment_intent.payment_failed", "pi_1", false);

        let result = f.handler.handle(signed(&payload)).await.unwrap();

        assert_eq!(result, HandleStripeWebhookResult::Acknowledged);
    }

    #[tokio::test]
    async fn test_mode_event_ignored_when_livemode_required() {
        let f = fixture(true);
        let (_booking, intent) = authorized(&f).await;
        f.gateway.set_status(&intent, AuthorizationStatus::Succeeded);

        let payload = event_json("payment_intent.succeeded", &intent, false);
        let result = f.handler.handle(signed(&payload)).await.unwrap();

        assert_eq!(result, HandleStripeWebhookResult::Ignored);
        assert!(!f.gateway.was_called("retrieve_authorization"));
    }
}
