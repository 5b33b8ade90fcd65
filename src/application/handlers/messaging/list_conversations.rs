//! ListConversationsHandler - Query handler for the caller's inbox.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, UserId};
use crate::domain::messaging::{ConversationWithParticipants, MessagingError};
use crate::ports::{ConversationRepository, ProfileRepository};

#[derive(Debug, Clone)]
pub struct ListConversationsQuery {
    pub caller: Option<AuthenticatedUser>,
}

/// Conversations newest activity first, silent ones last.
#[derive(Debug, Clone)]
pub struct ListConversationsResult {
    pub conversations: Vec<ConversationWithParticipants>,
}

pub struct ListConversationsHandler {
    conversations: Arc<dyn ConversationRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ListConversationsHandler {
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
        query: ListConversationsQuery,
    ) -> Result<ListConversationsResult, MessagingError> {
        let caller = query.caller.ok_or(MessagingError::NotAuthenticated)?;

        let conversations = self.conversations.list_for_participant(&caller.id).await?;

        let mut ids: Vec<UserId> = conversations
            .iter()
            .flat_map(|c| [c.participant_1, c.participant_2])
            .collect();
        ids.sort();
        ids.dedup();
        let summaries: HashMap<_, _> = self
            .profiles
            .find_summaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let conversations = conversations
            .into_iter()
            .map(|conversation| ConversationWithParticipants {
                participant_1: summaries.get(&conversation.participant_1).cloned(),
                participant_2: summaries.get(&conversation.participant_2).cloned(),
                conversation,
            })
            .collect();

        Ok(ListConversationsResult { conversations })
    }
}
