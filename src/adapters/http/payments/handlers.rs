//! HTTP handlers for payment endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::payment::{
    ConfirmPaymentCommand, ConfirmPaymentHandler, HandleStripeWebhookCommand,
    HandleStripeWebhookHandler, RefundPaymentCommand, RefundPaymentHandler,
};
use crate::domain::foundation::{BookingId, Money};
use crate::domain::payment::{PaymentError, WebhookError};

use super::dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, RefundRequest, RefundResponse,
    WebhookResponse,
};

/// Header carrying the Stripe webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Clone)]
pub struct PaymentHandlers {
    pub confirm: Arc<ConfirmPaymentHandler>,
    pub refund: Arc<RefundPaymentHandler>,
    pub webhook: Arc<HandleStripeWebhookHandler>,
}

/// POST /api/payments/confirm
pub async fn confirm_payment(
    State(handlers): State<PaymentHandlers>,
    RequireAuth(_user): RequireAuth,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .confirm
        .handle(ConfirmPaymentCommand {
            authorization_id: req.payment_intent_id,
        })
        .await?;

    Ok(Json(ConfirmPaymentResponse {
        payment_intent: result.authorization.into(),
        settled: result.settled,
    }))
}

/// POST /api/payments/refund (admin)
pub async fn refund_payment(
    State(handlers): State<PaymentHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<RefundRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking_id: BookingId = req
        .booking_id
        .parse()
        .map_err(|_| ApiError::invalid_id("booking", &req.booking_id))?;
    let amount = Money::from_major_units(req.amount)
        .map_err(|e| PaymentError::validation("amount", e.to_string()))?;

    let result = handlers
        .refund
        .handle(RefundPaymentCommand {
            caller: Some(user),
            booking_id,
            amount,
            reason: req.reason,
        })
        .await?;

    Ok(Json(RefundResponse::new(result.refund, result.booking.into())))
}

/// POST /api/webhooks/stripe
///
/// Authenticated by the `Stripe-Signature` header over the raw body.
pub async fn stripe_webhook(
    State(handlers): State<PaymentHandlers>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            PaymentError::InvalidWebhook(WebhookError::ParseError(
                "missing Stripe-Signature header".to_string(),
            ))
        })?
        .to_string();

    let result = handlers
        .webhook
        .handle(HandleStripeWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    Ok(Json(WebhookResponse::from(result)))
}
