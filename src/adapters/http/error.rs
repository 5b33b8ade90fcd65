//! HTTP error mapping.
//!
//! Every component error becomes an [`ApiError`]: a status code plus a JSON
//! body `{code, message}`. The status follows the error's [`ErrorCode`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::analytics::AnalyticsError;
use crate::domain::booking::BookingError;
use crate::domain::foundation::{AuthError, ErrorCode};
use crate::domain::messaging::MessagingError;
use crate::domain::payment::PaymentError;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: status_for(code),
            body: ErrorResponse {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_id(kind: &str, raw: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Invalid {} ID: {}", kind, raw),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        c if c.is_not_found() => StatusCode::NOT_FOUND,
        ErrorCode::Conflict | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
        ErrorCode::IdentityProviderError | ErrorCode::PaymentGatewayError => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.body.code,
                "Request failed: {}",
                self.body.message
            );
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::NotAuthenticated => ErrorCode::Unauthorized,
            AuthError::InsufficientPermissions => ErrorCode::Forbidden,
            AuthError::EmailAlreadyRegistered => ErrorCode::Conflict,
            AuthError::Rejected(_) => ErrorCode::ValidationFailed,
            AuthError::Upstream(_) | AuthError::ServiceUnavailable(_) => {
                ErrorCode::IdentityProviderError
            }
            AuthError::ProfileStorage(_) => ErrorCode::DatabaseError,
        };
        Self::new(code, err.to_string())
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self::new(err.code(), err.message())
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::new(err.code(), err.message())
    }
}

impl From<MessagingError> for ApiError {
    fn from(err: MessagingError) -> Self {
        Self::new(err.code(), err.message())
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        Self::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BookingId, ConversationId, Money};
    use crate::domain::booking::PaymentStatus;

    #[test]
    fn not_found_family_maps_to_404() {
        let err: ApiError = BookingError::not_found(BookingId::new()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body().code, "BOOKING_NOT_FOUND");

        let err: ApiError = MessagingError::ConversationNotFound(ConversationId::new()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn authorization_errors_map_to_401_and_403() {
        assert_eq!(
            ApiError::from(AnalyticsError::NotAuthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AnalyticsError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn state_conflicts_map_to_409() {
        let err: ApiError = BookingError::NotRefundable {
            payment_status: PaymentStatus::Pending,
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = AuthError::EmailAlreadyRegistered.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = PaymentError::Conflict("Booking payment is no longer paid".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_maps_to_400() {
        let err: ApiError = BookingError::InvalidRefundAmount {
            amount: Money::from_cents(0),
            max: Money::from_cents(100),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::invalid_id("booking", "x").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failures_map_to_502_with_message_untranslated() {
        let err: ApiError = BookingError::payment_failed("Your card was declined.").into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.body().message.contains("Your card was declined."));

        let err: ApiError = AuthError::upstream("rate limited").into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let err: ApiError = PaymentError::Infrastructure("pool timed out".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
