//! Live message feed port.
//!
//! Delivers newly committed messages to everyone currently watching a
//! conversation. Delivery is best-effort and in-process; a subscriber that
//! falls behind is told how many messages it missed and resumes from storage.

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::foundation::ConversationId;
use crate::domain::messaging::Message;

/// Identifies one live subscription so it can be released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A joined subscription: its id plus the receiving end of the room.
#[derive(Debug)]
pub struct FeedSubscription {
    pub subscriber: SubscriberId,
    pub receiver: broadcast::Receiver<Message>,
}

/// Per-conversation fan-out of committed messages.
#[async_trait]
pub trait MessageFeed: Send + Sync {
    /// Delivers a committed message to the conversation's current subscribers.
    ///
    /// Returns the number of subscribers reached; zero is not an error.
    async fn publish(&self, message: &Message) -> usize;

    /// Joins the conversation's room, creating it when absent.
    async fn join(&self, conversation_id: &ConversationId) -> FeedSubscription;

    /// Releases a subscription; the room is dropped with its last subscriber.
    async fn leave(&self, subscriber: &SubscriberId);
}
