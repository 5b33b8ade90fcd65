//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotAuthenticated | 401 |
//! | Forbidden | 403 |
//! | BookingNotFound / NoPaymentReference | 404 |
//! | NotRefundable / Conflict | 409 |
//! | InvalidAmount / ValidationFailed | 400 |
//! | InvalidWebhook | 400 |
//! | Gateway | 502 |
//! | Infrastructure | 500 |

use crate::domain::booking::{BookingError, PaymentStatus};
use crate::domain::foundation::{BookingId, DomainError, ErrorCode, Money};

use super::WebhookError;

/// Payment-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// No caller session.
    NotAuthenticated,

    /// Caller may not act on this payment.
    Forbidden,

    /// The booking being paid for does not exist.
    BookingNotFound(BookingId),

    /// No authorization has been recorded for the booking.
    NoPaymentReference(BookingId),

    /// Refund requested while the payment is not settled.
    NotRefundable { payment_status: PaymentStatus },

    /// Refund amount outside `0 < amount <= total`.
    InvalidAmount { amount: Money, max: Money },

    /// Other input validation failure.
    ValidationFailed { field: String, message: String },

    /// The booking's payment changed after it was read.
    Conflict(String),

    /// Webhook could not be authenticated or decoded.
    InvalidWebhook(WebhookError),

    /// The gateway refused or failed; message passed through untranslated.
    Gateway {
        message: String,
        provider_code: Option<String>,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl PaymentError {
    pub fn gateway(message: impl Into<String>, provider_code: Option<String>) -> Self {
        PaymentError::Gateway {
            message: message.into(),
            provider_code,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::NotAuthenticated => ErrorCode::Unauthorized,
            PaymentError::Forbidden => ErrorCode::Forbidden,
            PaymentError::BookingNotFound(_) | PaymentError::NoPaymentReference(_) => {
                ErrorCode::BookingNotFound
            }
            PaymentError::NotRefundable { .. } | PaymentError::Conflict(_) => ErrorCode::Conflict,
            PaymentError::InvalidAmount { .. } | PaymentError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            PaymentError::InvalidWebhook(_) => ErrorCode::InvalidFormat,
            PaymentError::Gateway { .. } => ErrorCode::PaymentGatewayError,
            PaymentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            PaymentError::NotAuthenticated => "Not authenticated".to_string(),
            PaymentError::Forbidden => "Not allowed to manage this payment".to_string(),
            PaymentError::BookingNotFound(id) => format!("Booking not found: {}", id),
            PaymentError::NoPaymentReference(id) => {
                format!("No payment recorded for booking {}", id)
            }
            PaymentError::NotRefundable { payment_status } => {
                format!("Payment is {}, only paid bookings can be refunded", payment_status)
            }
            PaymentError::InvalidAmount { amount, max } => {
                format!("Refund amount {} must be greater than 0 and at most {}", amount, max)
            }
            PaymentError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PaymentError::Conflict(msg) => msg.clone(),
            PaymentError::InvalidWebhook(err) => format!("Webhook rejected: {}", err),
            PaymentError::Gateway { message, .. } => message.clone(),
            PaymentError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PaymentError {}

impl From<WebhookError> for PaymentError {
    fn from(err: WebhookError) -> Self {
        PaymentError::InvalidWebhook(err)
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Conflict => PaymentError::Conflict(err.message),
            _ => PaymentError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BookingError> for PaymentError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotAuthenticated => PaymentError::NotAuthenticated,
            BookingError::Forbidden => PaymentError::Forbidden,
            BookingError::NotFound(id) => PaymentError::BookingNotFound(id),
            BookingError::NoPaymentReference(id) => PaymentError::NoPaymentReference(id),
            BookingError::NotRefundable { payment_status } => {
                PaymentError::NotRefundable { payment_status }
            }
            BookingError::InvalidRefundAmount { amount, max } => {
                PaymentError::InvalidAmount { amount, max }
            }
            BookingError::ValidationFailed { field, message } => {
                PaymentError::ValidationFailed { field, message }
            }
            BookingError::Conflict(message) => PaymentError::Conflict(message),
            BookingError::PaymentFailed(message) => PaymentError::Gateway {
                message,
                provider_code: None,
            },
            other => PaymentError::Infrastructure(other.message()),
        }
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
