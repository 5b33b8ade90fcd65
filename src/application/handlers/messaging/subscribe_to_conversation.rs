//! SubscribeToConversationHandler - Live message stream with resume support.
//!
//! A subscriber joins the conversation's feed *before* reading the backfill
//! from storage. Anything committed in between shows up in both; the stream
//! drops live copies of messages it already yielded from the backfill, so
//! no message is delivered twice.
//!
//! The backfill is in insertion order. Live delivery is best-effort and
//! follows publish order: two senders racing on one conversation may be
//! published in the opposite order to their commits. Clients that need
//! storage order resubscribe with their last seen id or sort by `created_at`.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::foundation::{AuthenticatedUser, ConversationId, MessageId};
use crate::domain::messaging::{Message, MessagingError};
use crate::ports::{ConversationRepository, MessageFeed, SubscriberId};

/// Command to subscribe to a conversation.
#[derive(Debug, Clone)]
pub struct SubscribeToConversationCommand {
    pub caller: Option<AuthenticatedUser>,
    pub conversation_id: ConversationId,
    /// Last message id the client has seen; stored messages after it are
    /// replayed before live delivery starts.
    pub resume_after: Option<MessageId>,
}

/// One item of a live subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Message(Message),
    /// The subscriber fell behind the feed buffer and `missed` messages were
    /// dropped. The client should resubscribe from its last seen id.
    Lagged { missed: u64 },
}

/// An open subscription. Release it with
/// [`SubscribeToConversationHandler::unsubscribe`] when the client goes away.
pub struct LiveSubscription {
    pub subscriber: SubscriberId,
    pub events: BoxStream<'static, LiveEvent>,
}

impl std::fmt::Debug for LiveSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSubscription")
            .field("subscriber", &self.subscriber)
            .finish_non_exhaustive()
    }
}

pub struct SubscribeToConversationHandler {
    conversations: Arc<dyn ConversationRepository>,
    feed: Arc<dyn MessageFeed>,
}

impl SubscribeToConversationHandler {
    pub fn new(conversations: Arc<dyn ConversationRepository>, feed: Arc<dyn MessageFeed>) -> Self {
        Self {
            conversations,
            feed,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubscribeToConversationCommand,
    ) -> Result<LiveSubscription, MessagingError> {
        let caller = cmd.caller.ok_or(MessagingError::NotAuthenticated)?;

        let conversation = self
            .conversations
            .find_by_id(&cmd.conversation_id)
            .await?
            .ok_or(MessagingError::ConversationNotFound(cmd.conversation_id))?;
        if !conversation.is_participant(&caller.id) {
            return Err(MessagingError::Forbidden);
        }

        let resume_point = match cmd.resume_after {
            Some(id) => {
                let message = self
                    .conversations
                    .find_message(&id)
                    .await?
                    .filter(|m| m.conversation_id == conversation.id)
                    .ok_or(MessagingError::ResumePointNotFound(id))?;
                Some(message)
            }
            None => None,
        };

        let subscription = self.feed.join(&conversation.id).await;

        let backfill = match resume_point {
            Some(after) => match self.conversations.messages_after(&conversation.id, &after).await {
                Ok(messages) => messages,
                Err(err) => {
                    self.feed.leave(&subscription.subscriber).await;
                    return Err(err.into());
                }
            },
            None => Vec::new(),
        };

        tracing::debug!(
            conversation_id = %conversation.id,
            subscriber = %subscription.subscriber,
            backfill = backfill.len(),
            "Live subscription opened"
        );

        let replayed: HashSet<MessageId> = backfill.iter().map(|m| m.id).collect();
        let events = stream::iter(backfill.into_iter().map(LiveEvent::Message))
            .chain(live_events(subscription.receiver, replayed))
            .boxed();

        Ok(LiveSubscription {
            subscriber: subscription.subscriber,
            events,
        })
    }

    /// Releases a subscription; its stream ends once the room is gone.
    pub async fn unsubscribe(&self, subscriber: &SubscriberId) {
        self.feed.leave(subscriber).await;
    }
}

fn live_events(
    receiver: broadcast::Receiver<Message>,
    replayed: HashSet<MessageId>,
) -> impl futures::Stream<Item = LiveEvent> + Send + 'static {
    stream::unfold((receiver, replayed), |(mut receiver, mut replayed)| async move {
        loop {
            match receiver.recv().await {
                Ok(message) => {
                    if replayed.remove(&message.id) {
                        continue;
                    }
                    return Some((LiveEvent::Message(message), (receiver, replayed)));
                }
                Err(RecvError::Lagged(missed)) => {
                    return Some((LiveEvent::Lagged { missed }, (receiver, replayed)));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
