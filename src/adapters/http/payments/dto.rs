//! HTTP DTOs for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::bookings::BookingResponse;
use crate::application::handlers::payment::HandleStripeWebhookResult;
use crate::ports::{Authorization, Refund};

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Gateway authorization (payment intent) id.
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundRequest {
    pub booking_id: String,
    /// Major currency units.
    pub amount: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationResponse {
    pub id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
}

impl From<Authorization> for AuthorizationResponse {
    fn from(a: Authorization) -> Self {
        Self {
            id: a.id,
            status: a.status.to_string(),
            amount: a.amount.as_major_units(),
            currency: a.currency,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmPaymentResponse {
    pub payment_intent: AuthorizationResponse,
    /// True when this call settled the booking.
    pub settled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundResponse {
    pub refund_id: String,
    pub amount: f64,
    pub status: String,
    pub booking: BookingResponse,
}

impl RefundResponse {
    pub fn new(refund: Refund, booking: BookingResponse) -> Self {
        Self {
            refund_id: refund.id,
            amount: refund.amount.as_major_units(),
            status: refund.status,
            booking,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled: Option<bool>,
}

impl From<HandleStripeWebhookResult> for WebhookResponse {
    fn from(result: HandleStripeWebhookResult) -> Self {
        let (outcome, settled) = match result {
            HandleStripeWebhookResult::Confirmed { settled, .. } => ("confirmed", Some(settled)),
            HandleStripeWebhookResult::Acknowledged => ("acknowledged", None),
            HandleStripeWebhookResult::Ignored => ("ignored", None),
        };
        Self {
            received: true,
            outcome,
            settled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_response_reports_settlement() {
        let json = serde_json::to_value(WebhookResponse::from(
            HandleStripeWebhookResult::Confirmed {
                authorization_id: "pi_1".to_string(),
                settled: true,
            },
        ))
        .unwrap();
        assert_eq!(json["outcome"], "confirmed");
        assert_eq!(json["settled"], true);

        let json = serde_json::to_value(WebhookResponse::from(HandleStripeWebhookResult::Ignored))
            .unwrap();
        assert_eq!(json["received"], true);
        assert!(json.get("settled").is_none());
    }

    #[test]
    fn refund_request_takes_major_units() {
        let req: RefundRequest = serde_json::from_str(
            r#"{"booking_id":"b","amount":49.5,"reason":"no-show"}"#,
        )
        .unwrap();
        assert_eq!(req.amount, 49.5);
    }
}
