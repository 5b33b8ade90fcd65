//! MarkReadHandler - Command handler for clearing the caller's unread messages.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, ConversationId, Timestamp};
use crate::domain::messaging::MessagingError;
use crate::ports::ConversationRepository;

#[derive(Debug, Clone)]
pub struct MarkReadCommand {
    pub caller: Option<AuthenticatedUser>,
    pub conversation_id: ConversationId,
}

#[derive(Debug, Clone)]
pub struct MarkReadResult {
    /// Messages that changed from unread to read.
    pub marked: u64,
}

/// Handler for read receipts.
///
/// Idempotent: messages already read keep their original `read_at`.
pub struct MarkReadHandler {
    conversations: Arc<dyn ConversationRepository>,
}

impl MarkReadHandler {
    pub fn new(conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { conversations }
    }

    pub async fn handle(&self, cmd: MarkReadCommand) -> Result<MarkReadResult, MessagingError> {
        let caller = cmd.caller.ok_or(MessagingError::NotAuthenticated)?;

        let conversation = self
            .conversations
            .find_by_id(&cmd.conversation_id)
            .await?
            .ok_or(MessagingError::ConversationNotFound(cmd.conversation_id))?;
        if !conversation.is_participant(&caller.id) {
            return Err(MessagingError::Forbidden);
        }

        let marked = self
            .conversations
            .mark_read(&conversation.id, &caller.id, Timestamp::now())
            .await?;

        Ok(MarkReadResult { marked })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::{UserId, UserType};
    use crate::domain::messaging::{Conversation, Message};

    async fn conversation_with_unread(store: &InMemoryStore) -> (Conversation, UserId, UserId) {
        let alice = store.seed_client("alice@example.com");
        let bob = store.seed_client("bob@example.com");
        let conversation = Conversation::start(alice, bob).unwrap();
        ConversationRepository::insert(store, &conversation).await.unwrap();
        for text in ["one", "two"] {
            let message = Message::compose(conversation.id, alice, bob, text, None).unwrap();
            store.append_message(&message).await.unwrap();
        }
        let reply = Message::compose(conversation.id, bob, alice, "three", None).unwrap();
        store.append_message(&reply).await.unwrap();
        (conversation, alice, bob)
    }

    #[tokio::test]
    async fn clears_only_the_readers_messages_and_counter() {
        let store = InMemoryStore::new();
        let (conversation, alice, bob) = conversation_with_unread(&store).await;
        let handler = MarkReadHandler::new(Arc::new(store.clone()));

        let result = handler
            .handle(MarkReadCommand {
                caller: Some(AuthenticatedUser::new(bob, "bob@example.com", UserType::Client)),
                conversation_id: conversation.id,
            })
            .await
            .unwrap();

        assert_eq!(result.marked, 2);
        let stored = store.conversation(&conversation.id).unwrap();
        assert_eq!(stored.unread_for(&bob), 0);
        assert_eq!(stored.unread_for(&alice), 1);
        let unread_by_alice = store
            .messages_in(&conversation.id)
            .iter()
            .filter(|m| m.is_unread_by(&alice))
            .count();
        assert_eq!(unread_by_alice, 1);
    }

    #[tokio::test]
    async fn second_call_changes_nothing() {
        let store = InMemoryStore::new();
        let (conversation, _alice, bob) = conversation_with_unread(&store).await;
        let handler = MarkReadHandler::new(Arc::new(store.clone()));
        let cmd = MarkReadCommand {
            caller: Some(AuthenticatedUser::new(bob, "bob@example.com", UserType::Client)),
            conversation_id: conversation.id,
        };

        handler.handle(cmd.clone()).await.unwrap();
        let first_read_at: Vec<_> = store
            .messages_in(&conversation.id)
            .iter()
            .map(|m| m.read_at)
            .collect();

        let again = handler.handle(cmd).await.unwrap();

        assert_eq!(again.marked, 0);
        let second_read_at: Vec<_> = store
            .messages_in(&conversation.id)
            .iter()
            .map(|m| m.read_at)
            .collect();
        assert_eq!(first_read_at, second_read_at);
    }

    #[tokio::test]
    async fn outsider_is_forbidden() {
        let store = InMemoryStore::new();
        let (conversation, _alice, bob) = conversation_with_unread(&store).await;
        let handler = MarkReadHandler::new(Arc::new(store.clone()));

        let err = handler
            .handle(MarkReadCommand {
                caller: Some(AuthenticatedUser::new(UserId::new(), "x@example.com", UserType::Admin)),
                conversation_id: conversation.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err, MessagingError::Forbidden);
        assert_eq!(store.conversation(&conversation.id).unwrap().unread_for(&bob), 2);
    }
}
