//! Payment gateway port.
//!
//! Authorizations (Stripe PaymentIntents) are created when a booking is made,
//! retrieved to confirm settlement, and refunded on request.
//!
//! # Design
//!
//! - **Minor units**: every amount crosses this port as [`Money`] cents
//! - **Idempotent**: create calls carry an idempotency key so a retried request
//!   cannot create a second authorization or refund

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{DomainError, ErrorCode, Money};

/// Port for the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an authorization for the requested amount.
    async fn create_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<Authorization, GatewayError>;

    /// Fetches the current state of an authorization.
    async fn retrieve_authorization(&self, id: &str) -> Result<Authorization, GatewayError>;

    /// Refunds part or all of a settled authorization.
    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, GatewayError>;
}

/// Request to authorize a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub amount: Money,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Stored on the gateway object (booking_id, client_id, companion_id).
    pub metadata: BTreeMap<String, String>,
    pub idempotency_key: String,
}

/// Gateway authorization handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub id: String,
    /// Secret the client uses to complete payment, absent on retrieve for
    /// some gateway configurations.
    pub client_secret: Option<String>,
    pub status: AuthorizationStatus,
    pub amount: Money,
    pub currency: String,
}

/// Gateway lifecycle of an authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    /// A status this service does not know about, kept verbatim.
    Other(String),
}

impl AuthorizationStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_action" => Self::RequiresAction,
            "processing" => Self::Processing,
            "requires_capture" => Self::RequiresCapture,
            "canceled" => Self::Canceled,
            "succeeded" => Self::Succeeded,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Other(s) => s,
        }
    }

    /// Only this status settles a booking.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to refund an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub payment_intent_id: String,
    pub amount: Money,
    /// Stored as refund metadata.
    pub reason: String,
    pub idempotency_key: String,
}

/// Gateway refund handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount: Money,
    pub status: String,
}

/// Payment gateway error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    /// Message from the gateway, passed to callers untranslated.
    pub message: String,
    /// Gateway's own error code (if available).
    pub provider_code: Option<String>,
    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    pub fn card_declined(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::CardDeclined, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let domain = DomainError::new(ErrorCode::PaymentGatewayError, err.message);
        match err.provider_code {
            Some(code) => domain.with_detail("provider_code", code),
            None => domain,
        }
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,
    /// API authentication failed.
    AuthenticationError,
    /// Card was declined.
    CardDeclined,
    /// Request parameters were rejected.
    InvalidRequest,
    /// Idempotency key reused with different parameters.
    IdempotencyConflict,
    /// Resource not found.
    NotFound,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Gateway-side failure.
    ProviderError,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError
                | GatewayErrorCode::RateLimitExceeded
                | GatewayErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::CardDeclined => "card_declined",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::IdempotencyConflict => "idempotency_conflict",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            GatewayErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
