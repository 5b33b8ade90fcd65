//! Webhook error types.

use thiserror::Error;

/// Errors that occur while authenticating or decoding a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl WebhookError {
    /// True when the failure means the sender could not be authenticated.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange
        )
    }
}
