//! Conversation repository port.

use async_trait::async_trait;

use crate::domain::foundation::{ConversationId, DomainError, MessageId, Timestamp, UserId};
use crate::domain::messaging::{Conversation, Message};

/// Persistence for conversations and their messages.
///
/// `append_message` and `mark_read` each change a message row and the
/// conversation summary together; implementations must make both writes
/// visible atomically.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn insert(&self, conversation: &Conversation) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError>;

    /// The conversation between two users, in either participant order.
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, DomainError>;

    /// Conversations of a user, newest activity first, silent ones last.
    async fn list_for_participant(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, DomainError>;

    /// Stores the message and applies it to the conversation summary:
    /// last_message_at, preview, and +1 on the recipient's unread counter.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the conversation does not exist
    async fn append_message(&self, message: &Message) -> Result<(), DomainError>;

    /// Marks the reader's unread messages read at `at` and zeroes the reader's
    /// counter. Returns how many messages changed.
    async fn mark_read(
        &self,
        conversation_id: &ConversationId,
        reader: &UserId,
        at: Timestamp,
    ) -> Result<u64, DomainError>;

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, DomainError>;

    /// Messages of the conversation stored after `after`, in insertion order.
    async fn messages_after(
        &self,
        conversation_id: &ConversationId,
        after: &Message,
    ) -> Result<Vec<Message>, DomainError>;
}
