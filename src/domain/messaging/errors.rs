//! Messaging error types.

use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, MessageId, UserId, ValidationError,
};

/// Messaging-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// No caller session.
    NotAuthenticated,

    /// Conversation does not exist.
    ConversationNotFound(ConversationId),

    /// Caller is not one of the two participants.
    Forbidden,

    /// The other participant has no profile.
    ParticipantNotFound(UserId),

    /// Caller tried to open a conversation with themselves.
    SelfConversation,

    /// The resume token does not name a message of this conversation.
    ResumePointNotFound(MessageId),

    /// Input validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl MessagingError {
    pub fn infrastructure(message: impl Into<String>) -> Self {
        MessagingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MessagingError::NotAuthenticated => ErrorCode::Unauthorized,
            MessagingError::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            MessagingError::ParticipantNotFound(_) => ErrorCode::ProfileNotFound,
            MessagingError::Forbidden => ErrorCode::Forbidden,
            MessagingError::SelfConversation | MessagingError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            MessagingError::ResumePointNotFound(_) => ErrorCode::MessageNotFound,
            MessagingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            MessagingError::NotAuthenticated => "Not authenticated".to_string(),
            MessagingError::ConversationNotFound(id) => format!("Conversation not found: {}", id),
            MessagingError::ParticipantNotFound(id) => format!("User not found: {}", id),
            MessagingError::Forbidden => "Not a participant in this conversation".to_string(),
            MessagingError::SelfConversation => {
                "Cannot start a conversation with yourself".to_string()
            }
            MessagingError::ResumePointNotFound(id) => {
                format!("Message {} not found in this conversation", id)
            }
            MessagingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            MessagingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for MessagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MessagingError {}

impl From<ValidationError> for MessagingError {
    fn from(err: ValidationError) -> Self {
        MessagingError::ValidationFailed {
            field: err.field().unwrap_or("input").to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for MessagingError {
    fn from(err: DomainError) -> Self {
        MessagingError::Infrastructure(err.to_string())
    }
}

impl From<MessagingError> for DomainError {
    fn from(err: MessagingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
