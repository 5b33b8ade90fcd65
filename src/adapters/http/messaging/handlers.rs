//! HTTP handlers for messaging endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::messaging::{
    ListConversationsHandler, ListConversationsQuery, MarkReadCommand, MarkReadHandler,
    OpenConversationCommand, OpenConversationHandler, SendMessageCommand, SendMessageHandler,
};
use crate::domain::foundation::{ConversationId, UserId};

use super::dto::{
    ConversationListResponse, MarkReadResponse, MessageResponse, OpenConversationRequest,
    OpenConversationResponse, SendMessageRequest,
};

#[derive(Clone)]
pub struct MessagingHandlers {
    pub open: Arc<OpenConversationHandler>,
    pub list: Arc<ListConversationsHandler>,
    pub send: Arc<SendMessageHandler>,
    pub mark_read: Arc<MarkReadHandler>,
}

pub(crate) fn parse_conversation_id(raw: &str) -> Result<ConversationId, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid_id("conversation", raw))
}

/// POST /api/conversations
pub async fn open_conversation(
    State(handlers): State<MessagingHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<OpenConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let other: UserId = req
        .participant_id
        .parse()
        .map_err(|_| ApiError::invalid_id("user", &req.participant_id))?;

    let result = handlers
        .open
        .handle(OpenConversationCommand {
            caller: Some(user),
            other_participant: other,
        })
        .await?;

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(OpenConversationResponse {
            conversation: result.conversation.into(),
            created: result.created,
        }),
    ))
}

/// GET /api/conversations
pub async fn list_conversations(
    State(handlers): State<MessagingHandlers>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .list
        .handle(ListConversationsQuery { caller: Some(user) })
        .await?;

    Ok(Json(ConversationListResponse {
        conversations: result.conversations.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/conversations/:id/messages
pub async fn send_message(
    State(handlers): State<MessagingHandlers>,
    RequireAuth(user): RequireAuth,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .send
        .handle(SendMessageCommand {
            caller: Some(user),
            conversation_id: parse_conversation_id(&conversation_id)?,
            content: req.content,
            message_type: req.message_type,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(result.message))))
}

/// POST /api/conversations/:id/read
pub async fn mark_read(
    State(handlers): State<MessagingHandlers>,
    RequireAuth(user): RequireAuth,
    Path(conversation_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .mark_read
        .handle(MarkReadCommand {
            caller: Some(user),
            conversation_id: parse_conversation_id(&conversation_id)?,
        })
        .await?;

    Ok(Json(MarkReadResponse {
        marked: result.marked,
    }))
}
