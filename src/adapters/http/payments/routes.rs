//! HTTP routes for payment endpoints.

use axum::{routing::post, Router};

use super::handlers::{confirm_payment, refund_payment, stripe_webhook, PaymentHandlers};

/// Creates the payment router.
///
/// Paths are absolute since the webhook does not live under `/api/payments`;
/// merge this router at the root.
pub fn payment_routes(handlers: PaymentHandlers) -> Router {
    Router::new()
        .route("/api/payments/confirm", post(confirm_payment))
        .route("/api/payments/refund", post(refund_payment))
        .route("/api/webhooks/stripe", post(stripe_webhook))
        .with_state(handlers)
}
