//! Analytics error types.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// No caller session.
    NotAuthenticated,

    /// Caller lacks the admin role.
    Forbidden,

    /// Input validation failed (blank event type, malformed time range).
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl AnalyticsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalyticsError::NotAuthenticated => ErrorCode::Unauthorized,
            AnalyticsError::Forbidden => ErrorCode::Forbidden,
            AnalyticsError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            AnalyticsError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AnalyticsError::NotAuthenticated => "Not authenticated".to_string(),
            AnalyticsError::Forbidden => "Admin access required".to_string(),
            AnalyticsError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            AnalyticsError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AnalyticsError {}

impl From<ValidationError> for AnalyticsError {
    fn from(err: ValidationError) -> Self {
        AnalyticsError::ValidationFailed {
            field: err.field().unwrap_or("input").to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for AnalyticsError {
    fn from(err: DomainError) -> Self {
        AnalyticsError::Infrastructure(err.to_string())
    }
}
