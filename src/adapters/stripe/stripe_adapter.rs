//! Stripe payment gateway adapter.
//!
//! Implements `PaymentGateway` against the Stripe REST API: PaymentIntents for
//! authorizations and Refunds. Requests are form-encoded and authenticated with
//! the secret key over HTTP basic auth; create calls send an `Idempotency-Key`.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::domain::foundation::Money;
use crate::ports::{
    Authorization, AuthorizationRequest, AuthorizationStatus, GatewayError, GatewayErrorCode,
    PaymentGateway, Refund, RefundRequest,
};

use super::api_types::{StripeErrorEnvelope, StripePaymentIntent, StripeRefund};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request timeout.
    timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from the validated application payment settings.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            api_key: SecretString::new(config.stripe_secret_key.clone()),
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripePaymentGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentGateway {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::provider(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn send_form(
        &self,
        path: &str,
        params: &[(String, String)],
        idempotency_key: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        self.http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .header("Idempotency-Key", idempotency_key)
            .form(params)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = map_error_response(status, &body);
            tracing::error!(
                operation,
                status = %status,
                code = %error.code,
                provider_code = ?error.provider_code,
                "Stripe request failed"
            );
            return Err(error);
        }
        response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn to_authorization(intent: StripePaymentIntent) -> Authorization {
    Authorization {
        status: AuthorizationStatus::parse(&intent.status),
        amount: Money::from_cents(intent.amount),
        id: intent.id,
        client_secret: intent.client_secret,
        currency: intent.currency,
    }
}

/// Translates a Stripe error response, keeping Stripe's message verbatim.
fn map_error_response(status: StatusCode, body: &str) -> GatewayError {
    let Ok(envelope) = serde_json::from_str::<StripeErrorEnvelope>(body) else {
        return GatewayError::new(
            code_for_status(status),
            format!("Stripe API error ({}): {}", status, body),
        );
    };
    let api = envelope.error;
    let code = match api.error_type.as_str() {
        "card_error" => GatewayErrorCode::CardDeclined,
        "idempotency_error" => GatewayErrorCode::IdempotencyConflict,
        "invalid_request_error" if status == StatusCode::NOT_FOUND => GatewayErrorCode::NotFound,
        "invalid_request_error" => GatewayErrorCode::InvalidRequest,
        "authentication_error" => GatewayErrorCode::AuthenticationError,
        "rate_limit_error" => GatewayErrorCode::RateLimitExceeded,
        _ => code_for_status(status),
    };
    let message = api
        .message
        .unwrap_or_else(|| format!("Stripe API error ({})", status));
    let error = GatewayError::new(code, message);
    match api.decline_code.or(api.code) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

fn code_for_status(status: StatusCode) -> GatewayErrorCode {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayErrorCode::AuthenticationError,
        StatusCode::NOT_FOUND => GatewayErrorCode::NotFound,
        StatusCode::CONFLICT => GatewayErrorCode::IdempotencyConflict,
        StatusCode::TOO_MANY_REQUESTS => GatewayErrorCode::RateLimitExceeded,
        StatusCode::PAYMENT_REQUIRED => GatewayErrorCode::CardDeclined,
        s if s.is_client_error() => GatewayErrorCode::InvalidRequest,
        _ => GatewayErrorCode::ProviderError,
    }
}

fn authorization_params(request: &AuthorizationRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("amount".to_string(), request.amount.cents().to_string()),
        ("currency".to_string(), request.currency.clone()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];
    for (key, value) in &request.metadata {
        params.push((format!("metadata[{}]", key), value.clone()));
    }
    params
}

fn refund_params(request: &RefundRequest) -> Vec<(String, String)> {
    vec![
        (
            "payment_intent".to_string(),
            request.payment_intent_id.clone(),
        ),
        ("amount".to_string(), request.amount.cents().to_string()),
        ("metadata[reason]".to_string(), request.reason.clone()),
    ]
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<Authorization, GatewayError> {
        let params = authorization_params(&request);
        let response = self
            .send_form("/v1/payment_intents", &params, &request.idempotency_key)
            .await?;
        let intent: StripePaymentIntent =
            Self::parse_json(response, "create_payment_intent").await?;

        tracing::info!(
            payment_intent_id = %intent.id,
            amount = intent.amount,
            "Stripe payment intent created"
        );
        Ok(to_authorization(intent))
    }

    async fn retrieve_authorization(&self, id: &str) -> Result<Authorization, GatewayError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/payment_intents/{}", id)))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;
        let intent: StripePaymentIntent =
            Self::parse_json(response, "retrieve_payment_intent").await?;
        Ok(to_authorization(intent))
    }

    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, GatewayError> {
        let params = refund_params(&request);
        let response = self
            .send_form("/v1/refunds", &params, &request.idempotency_key)
            .await?;
        let refund: StripeRefund = Self::parse_json(response, "create_refund").await?;

        tracing::info!(refund_id = %refund.id, amount = refund.amount, "Stripe refund created");
        Ok(Refund {
            id: refund.id,
            amount: Money::from_cents(refund.amount),
            status: refund.status.unwrap_or_else(|| "pending".to_string()),
        })
    }
}
