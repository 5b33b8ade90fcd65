//! Conversation rooms for live message delivery.
//!
//! Rooms are organized by conversation ID, so a committed message is pushed
//! only to the sockets watching that conversation.
//!
//! # Architecture
//!
//! ```text
//! Room: conversation-123    Room: conversation-456
//! ├── subscriber-a          ├── subscriber-d
//! └── subscriber-b          └── subscriber-e
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crate::domain::foundation::ConversationId;
use crate::domain::messaging::Message;
use crate::ports::{FeedSubscription, MessageFeed, SubscriberId};

/// Default per-room buffer; a subscriber further behind than this lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// In-process `MessageFeed` backed by one broadcast channel per conversation.
///
/// Uses `RwLock` for the room registry since publishes (reads) vastly
/// outnumber joins and leaves (writes).
pub struct ConversationRooms {
    /// conversation_id → broadcast sender for that room.
    rooms: RwLock<HashMap<ConversationId, broadcast::Sender<Message>>>,

    /// subscriber_id → conversation_id for O(1) cleanup on disconnect.
    subscribers: RwLock<HashMap<SubscriberId, ConversationId>>,

    channel_capacity: usize,
}

impl ConversationRooms {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            subscribers: RwLock::new(HashMap::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Number of subscribers currently joined to a conversation.
    pub async fn subscriber_count(&self, conversation_id: &ConversationId) -> usize {
        self.subscribers
            .read()
            .await
            .values()
            .filter(|c| *c == conversation_id)
            .count()
    }

    /// Conversations with at least one joined subscriber.
    pub async fn active_rooms(&self) -> Vec<ConversationId> {
        self.rooms.read().await.keys().copied().collect()
    }
}

impl Default for ConversationRooms {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl MessageFeed for ConversationRooms {
    async fn publish(&self, message: &Message) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(&message.conversation_id) {
            // Send fails only when every receiver is gone
            Some(sender) => sender.send(message.clone()).unwrap_or(0),
            None => 0,
        }
    }

    async fn join(&self, conversation_id: &ConversationId) -> FeedSubscription {
        let mut rooms = self.rooms.write().await;
        let sender = rooms.entry(*conversation_id).or_insert_with(|| {
            let (tx, _) = broadcast::channel(self.channel_capacity);
            tx
        });
        let receiver = sender.subscribe();

        let subscriber = SubscriberId::new();
        self.subscribers
            .write()
            .await
            .insert(subscriber, *conversation_id);

        tracing::debug!(%subscriber, conversation_id = %conversation_id, "joined conversation room");
        FeedSubscription {
            subscriber,
            receiver,
        }
    }

    async fn leave(&self, subscriber: &SubscriberId) {
        let mut rooms = self.rooms.write().await;
        let mut subscribers = self.subscribers.write().await;

        if let Some(conversation_id) = subscribers.remove(subscriber) {
            let still_watched = subscribers.values().any(|c| *c == conversation_id);
            if !still_watched {
                rooms.remove(&conversation_id);
                tracing::debug!(conversation_id = %conversation_id, "closed empty conversation room");
            }
        }
    }
}
