//! Chat messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId, ValidationError};

/// Message type used when the sender does not specify one.
pub const DEFAULT_MESSAGE_TYPE: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub content: String,
    pub message_type: String,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Message {
    /// Builds an unread message, rejecting empty content.
    pub fn compose(
        conversation_id: ConversationId,
        sender_id: UserId,
        recipient_id: UserId,
        content: impl Into<String>,
        message_type: Option<String>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        let message_type = match message_type {
            Some(t) if t.trim().is_empty() => return Err(ValidationError::empty_field("message_type")),
            Some(t) => t,
            None => DEFAULT_MESSAGE_TYPE.to_string(),
        };

        Ok(Self {
            id: MessageId::new(),
            conversation_id,
            sender_id,
            recipient_id,
            content,
            message_type,
            read_at: None,
            created_at: Timestamp::now(),
        })
    }

    pub fn is_unread_by(&self, reader: &UserId) -> bool {
        self.recipient_id == *reader && self.read_at.is_none()
    }

    /// Sets `read_at` unless already set; returns whether it changed.
    pub fn mark_read(&mut self, at: Timestamp) -> bool {
        if self.read_at.is_some() {
            return false;
        }
        self.read_at = Some(at);
        true
    }
}
