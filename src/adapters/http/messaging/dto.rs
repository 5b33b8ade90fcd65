//! HTTP DTOs for messaging endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::dto::ParticipantResponse;
use crate::domain::messaging::{Conversation, ConversationWithParticipants, Message};

#[derive(Debug, Clone, Deserialize)]
pub struct OpenConversationRequest {
    pub participant_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub message_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub participant_1: String,
    pub participant_2: String,
    pub unread_count_1: u32,
    pub unread_count_2: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_preview: Option<String>,
    pub created_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id.to_string(),
            participant_1: c.participant_1.to_string(),
            participant_2: c.participant_2.to_string(),
            unread_count_1: c.unread_count_1,
            unread_count_2: c.unread_count_2,
            last_message_at: c.last_message_at.map(|t| t.as_datetime().to_rfc3339()),
            last_message_preview: c.last_message_preview,
            created_at: c.created_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenConversationResponse {
    pub conversation: ConversationResponse,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummaryResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub participant_1_profile: Option<ParticipantResponse>,
    pub participant_2_profile: Option<ParticipantResponse>,
}

impl From<ConversationWithParticipants> for ConversationSummaryResponse {
    fn from(c: ConversationWithParticipants) -> Self {
        Self {
            conversation: c.conversation.into(),
            participant_1_profile: c.participant_1.map(Into::into),
            participant_2_profile: c.participant_2.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummaryResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id.to_string(),
            conversation_id: m.conversation_id.to_string(),
            sender_id: m.sender_id.to_string(),
            recipient_id: m.recipient_id.to_string(),
            content: m.content,
            message_type: m.message_type,
            read_at: m.read_at.map(|t| t.as_datetime().to_rfc3339()),
            created_at: m.created_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub marked: u64,
}
