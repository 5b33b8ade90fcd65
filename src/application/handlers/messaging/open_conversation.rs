//! OpenConversationHandler - Command handler for starting or resuming a conversation.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, ErrorCode, UserId};
use crate::domain::messaging::{Conversation, MessagingError};
use crate::ports::{ConversationRepository, ProfileRepository};

/// Command to open a conversation with another user.
#[derive(Debug, Clone)]
pub struct OpenConversationCommand {
    pub caller: Option<AuthenticatedUser>,
    pub other_participant: UserId,
}

#[derive(Debug, Clone)]
pub struct OpenConversationResult {
    pub conversation: Conversation,
    /// False when an existing conversation was returned.
    pub created: bool,
}

/// Handler for opening conversations.
///
/// There is at most one conversation per pair of users. A concurrent open
/// that loses the insert race returns the winner's conversation.
pub struct OpenConversationHandler {
    conversations: Arc<dyn ConversationRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl OpenConversationHandler {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            conversations,
            profiles,
        }
    }

    pub async fn handle(
        &self,
        cmd: OpenConversationCommand,
    ) -> Result<OpenConversationResult, MessagingError> {
        let caller = cmd.caller.ok_or(MessagingError::NotAuthenticated)?;
        if caller.id == cmd.other_participant {
            return Err(MessagingError::SelfConversation);
        }

        if let Some(conversation) = self.find_existing(&caller.id, &cmd.other_participant).await? {
            return Ok(OpenConversationResult {
                conversation,
                created: false,
            });
        }

        if self.profiles.find_by_id(&cmd.other_participant).await?.is_none() {
            return Err(MessagingError::ParticipantNotFound(cmd.other_participant));
        }

        let conversation = Conversation::start(caller.id, cmd.other_participant)?;
        match self.conversations.insert(&conversation).await {
            Ok(()) => {
                tracing::info!(conversation_id = %conversation.id, "Conversation started");
                Ok(OpenConversationResult {
                    conversation,
                    created: true,
                })
            }
            Err(err) if err.code == ErrorCode::Conflict => {
                let conversation = self
                    .find_existing(&caller.id, &cmd.other_participant)
                    .await?
                    .ok_or_else(|| MessagingError::infrastructure(err.to_string()))?;
                Ok(OpenConversationResult {
                    conversation,
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_existing(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, MessagingError> {
        Ok(self.conversations.find_between(a, b).await?)
    }
}
