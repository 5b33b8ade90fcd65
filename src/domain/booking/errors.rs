//! Booking-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotAuthenticated | 401 |
//! | Forbidden | 403 |
//! | NotFound / CompanionNotFound / NoPaymentReference | 404 |
//! | InvalidTransition / NotRefundable / Conflict | 409 |
//! | InvalidRefundAmount / ValidationFailed | 400 |
//! | PaymentFailed | 502 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, Money, UserId, ValidationError,
};

use super::PaymentStatus;

/// Booking-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// No caller session.
    NotAuthenticated,

    /// Booking does not exist.
    NotFound(BookingId),

    /// No hourly rate is registered for the companion.
    CompanionNotFound(UserId),

    /// Caller is neither a participant nor an admin.
    Forbidden,

    /// Requested status change is not a legal transition.
    InvalidTransition { from: String, to: String },

    /// Refund requested for a booking without a recorded payment.
    NoPaymentReference(BookingId),

    /// Refund requested while the payment is not settled.
    NotRefundable { payment_status: PaymentStatus },

    /// Refund amount outside `0 < amount <= total_amount`.
    InvalidRefundAmount { amount: Money, max: Money },

    /// Input validation failed.
    ValidationFailed { field: String, message: String },

    /// The booking changed after it was read.
    Conflict(String),

    /// Payment gateway refused or failed; message passed through untranslated.
    PaymentFailed(String),

    /// Infrastructure error.
    Infrastructure(String),
}

impl BookingError {
    pub fn not_found(id: BookingId) -> Self {
        BookingError::NotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn payment_failed(message: impl Into<String>) -> Self {
        BookingError::PaymentFailed(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BookingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::NotAuthenticated => ErrorCode::Unauthorized,
            BookingError::NotFound(_) | BookingError::NoPaymentReference(_) => {
                ErrorCode::BookingNotFound
            }
            BookingError::CompanionNotFound(_) => ErrorCode::CompanionNotFound,
            BookingError::Forbidden => ErrorCode::Forbidden,
            BookingError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            BookingError::NotRefundable { .. } | BookingError::Conflict(_) => ErrorCode::Conflict,
            BookingError::InvalidRefundAmount { .. } | BookingError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            BookingError::PaymentFailed(_) => ErrorCode::PaymentGatewayError,
            BookingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BookingError::NotAuthenticated => "Not authenticated".to_string(),
            BookingError::NotFound(id) => format!("Booking not found: {}", id),
            BookingError::CompanionNotFound(id) => format!("Companion not found: {}", id),
            BookingError::Forbidden => "Not a participant in this booking".to_string(),
            BookingError::InvalidTransition { from, to } => {
                format!("Cannot change booking status from {} to {}", from, to)
            }
            BookingError::NoPaymentReference(id) => {
                format!("No payment recorded for booking {}", id)
            }
            BookingError::NotRefundable { payment_status } => {
                format!("Payment is {}, only paid bookings can be refunded", payment_status)
            }
            BookingError::InvalidRefundAmount { amount, max } => {
                format!("Refund amount {} must be greater than 0 and at most {}", amount, max)
            }
            BookingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BookingError::Conflict(msg) => msg.clone(),
            BookingError::PaymentFailed(msg) => msg.clone(),
            BookingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BookingError {}

impl From<ValidationError> for BookingError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidTransition { from, to } => {
                BookingError::InvalidTransition { from, to }
            }
            other => BookingError::ValidationFailed {
                field: other.field().unwrap_or("input").to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<DomainError> for BookingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => BookingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "input".to_string()),
                message: err.message,
            },
            ErrorCode::Conflict => BookingError::Conflict(err.message),
            _ => BookingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BookingError> for DomainError {
    fn from(err: BookingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_converts_from_validation_error() {
        let err: BookingError = ValidationError::invalid_transition("completed", "pending").into();
        assert_eq!(
            err,
            BookingError::InvalidTransition {
                from: "completed".to_string(),
                to: "pending".to_string()
            }
        );
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn payment_failure_keeps_upstream_message() {
        let err = BookingError::payment_failed("Your card was declined.");
        assert_eq!(err.message(), "Your card was declined.");
        assert_eq!(err.code(), ErrorCode::PaymentGatewayError);
    }

    #[test]
    fn database_errors_become_infrastructure() {
        let err: BookingError = DomainError::database("connection reset").into();
        assert!(matches!(err, BookingError::Infrastructure(_)));
    }

    #[test]
    fn stale_write_becomes_conflict() {
        let err: BookingError =
            DomainError::new(ErrorCode::Conflict, "Booking is no longer pending").into();
        assert_eq!(err, BookingError::Conflict("Booking is no longer pending".to_string()));
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[test]
    fn validation_domain_error_keeps_field() {
        let err: BookingError = DomainError::validation("duration_hours", "too long").into();
        assert_eq!(
            err,
            BookingError::ValidationFailed {
                field: "duration_hours".to_string(),
                message: "too long".to_string()
            }
        );
    }
}
