//! SendMessageHandler - Command handler for posting a message to a conversation.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, ConversationId};
use crate::domain::messaging::{Message, MessagingError};
use crate::ports::{ConversationRepository, MessageFeed};

/// Command to send a message.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub caller: Option<AuthenticatedUser>,
    pub conversation_id: ConversationId,
    pub content: String,
    /// Defaults to `text`.
    pub message_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub message: Message,
    /// Live subscribers the message reached.
    pub delivered_to: usize,
}

/// Handler for sending messages.
///
/// The message row and the conversation summary (preview, timestamp,
/// recipient's unread counter) are committed together by the repository.
/// Live subscribers are notified only after that commit; concurrent sends
/// to one conversation are not ordered against each other on the feed.
pub struct SendMessageHandler {
    conversations: Arc<dyn ConversationRepository>,
    feed: Arc<dyn MessageFeed>,
}

impl SendMessageHandler {
    pub fn new(conversations: Arc<dyn ConversationRepository>, feed: Arc<dyn MessageFeed>) -> Self {
        Self {
            conversations,
            feed,
        }
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<SendMessageResult, MessagingError> {
        let caller = cmd.caller.ok_or(MessagingError::NotAuthenticated)?;

        let conversation = self
            .conversations
            .find_by_id(&cmd.conversation_id)
            .await?
            .ok_or(MessagingError::ConversationNotFound(cmd.conversation_id))?;

        let recipient = conversation
            .other_participant(&caller.id)
            .ok_or(MessagingError::Forbidden)?;

        let message = Message::compose(
            conversation.id,
            caller.id,
            recipient,
            cmd.content,
            cmd.message_type,
        )?;
        self.conversations.append_message(&message).await?;

        let delivered_to = self.feed.publish(&message).await;
        tracing::debug!(
            conversation_id = %conversation.id,
            message_id = %message.id,
            delivered_to,
            "Message sent"
        );

        Ok(SendMessageResult {
            message,
            delivered_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::websocket::ConversationRooms;
    use crate::domain::foundation::{UserId, UserType};
    use crate::domain::messaging::{Conversation, PREVIEW_CHARS};

    struct Fixture {
        store: InMemoryStore,
        rooms: Arc<ConversationRooms>,
        handler: SendMessageHandler,
        conversation: Conversation,
        alice: AuthenticatedUser,
        bob: AuthenticatedUser,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let rooms = Arc::new(ConversationRooms::default());
        let alice_id = store.seed_client("alice@example.com");
        let bob_id = store.seed_client("bob@example.com");
        let conversation = Conversation::start(alice_id, bob_id).unwrap();
        ConversationRepository::insert(&store, &conversation).await.unwrap();
        let handler = SendMessageHandler::new(Arc::new(store.clone()), rooms.clone());
        Fixture {
            store,
            rooms,
            handler,
            conversation,
            alice: AuthenticatedUser::new(alice_id, "alice@example.com", UserType::Client),
            bob: AuthenticatedUser::new(bob_id, "bob@example.com", UserType::Client),
        }
    }

    fn send(f: &Fixture, from: &AuthenticatedUser, content: &str) -> SendMessageCommand {
        SendMessageCommand {
            caller: Some(from.clone()),
            conversation_id: f.conversation.id,
            content: content.to_string(),
            message_type: None,
        }
    }

    #[tokio::test]
    async fn increments_only_the_recipients_counter() {
        let f = fixture().await;

        f.handler.handle(send(&f, &f.alice, "hi")).await.unwrap();
        f.handler.handle(send(&f, &f.alice, "are you free?")).await.unwrap();
        f.handler.handle(send(&f, &f.bob, "yes")).await.unwrap();

        let stored = f.store.conversation(&f.conversation.id).unwrap();
        assert_eq!(stored.unread_for(&f.bob.id), 2);
        assert_eq!(stored.unread_for(&f.alice.id), 1);
        assert_eq!(stored.last_message_preview.as_deref(), Some("yes"));
        assert!(stored.last_message_at.is_some());
    }

    #[tokio::test]
    async fn message_targets_other_participant_with_default_type() {
        let f = fixture().await;

        let result = f.handler.handle(send(&f, &f.bob, "hello")).await.unwrap();

        assert_eq!(result.message.sender_id, f.bob.id);
        assert_eq!(result.message.recipient_id, f.alice.id);
        assert_eq!(result.message.message_type, "text");
        assert!(result.message.read_at.is_none());
        assert_eq!(f.store.messages_in(&f.conversation.id).len(), 1);
    }

    #[tokio::test]
    async fn preview_is_truncated() {
        let f = fixture().await;
        let long = "x".repeat(250);

        f.handler.handle(send(&f, &f.alice, &long)).await.unwrap();

        let preview = f
            .store
            .conversation(&f.conversation.id)
            .unwrap()
            .last_message_preview
            .unwrap();
        assert_eq!(preview.chars().count(), PREVIEW_CHARS);
    }

    #[tokio::test]
    async fn publishes_to_live_subscribers() {
        let f = fixture().await;
        let mut subscription = f.rooms.join(&f.conversation.id).await;

        let result = f.handler.handle(send(&f, &f.alice, "ping")).await.unwrap();

        assert_eq!(result.delivered_to, 1);
        let received = subscription.receiver.recv().await.unwrap();
        assert_eq!(received.id, result.message.id);
    }

    #[tokio::test]
    async fn outsider_is_forbidden() {
        let f = fixture().await;
        let mallory = AuthenticatedUser::new(UserId::new(), "m@example.com", UserType::Client);

        let err = f.handler.handle(send(&f, &mallory, "hi")).await.unwrap_err();

        assert_eq!(err, MessagingError::Forbidden);
        assert!(f.store.messages_in(&f.conversation.id).is_empty());
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let f = fixture().await;
        let mut cmd = send(&f, &f.alice, "hi");
        let missing = ConversationId::new();
        cmd.conversation_id = missing;

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert_eq!(err, MessagingError::ConversationNotFound(missing));
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let f = fixture().await;

        let err = f.handler.handle(send(&f, &f.alice, "   ")).await.unwrap_err();

        assert!(matches!(err, MessagingError::ValidationFailed { .. }));
        let stored = f.store.conversation(&f.conversation.id).unwrap();
        assert_eq!(stored.unread_for(&f.bob.id), 0);
    }
}
