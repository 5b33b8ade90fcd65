//! Two-party conversation with per-participant unread counters.
//!
//! Counters are addressed by participant id, never by "the other slot", so a
//! sender can only ever increment the recipient's counter.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use crate::domain::profile::ParticipantSummary;

use super::{Message, MessagingError};

/// Maximum number of characters kept as the conversation preview.
pub const PREVIEW_CHARS: usize = 100;

/// Returns the first [`PREVIEW_CHARS`] characters of `content`.
pub fn preview_of(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

/// Which of the two participant columns a user occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantSlot {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_1: UserId,
    pub participant_2: UserId,
    pub unread_count_1: u32,
    pub unread_count_2: u32,
    pub last_message_at: Option<Timestamp>,
    pub last_message_preview: Option<String>,
    pub created_at: Timestamp,
}

impl Conversation {
    /// Starts an empty conversation between two distinct users.
    pub fn start(participant_1: UserId, participant_2: UserId) -> Result<Self, MessagingError> {
        if participant_1 == participant_2 {
            return Err(MessagingError::SelfConversation);
        }
        Ok(Self {
            id: ConversationId::new(),
            participant_1,
            participant_2,
            unread_count_1: 0,
            unread_count_2: 0,
            last_message_at: None,
            last_message_preview: None,
            created_at: Timestamp::now(),
        })
    }

    pub fn slot_of(&self, user_id: &UserId) -> Option<ParticipantSlot> {
        if self.participant_1 == *user_id {
            Some(ParticipantSlot::First)
        } else if self.participant_2 == *user_id {
            Some(ParticipantSlot::Second)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.slot_of(user_id).is_some()
    }

    /// The participant who is not `user_id`, or `None` for outsiders.
    pub fn other_participant(&self, user_id: &UserId) -> Option<UserId> {
        match self.slot_of(user_id)? {
            ParticipantSlot::First => Some(self.participant_2),
            ParticipantSlot::Second => Some(self.participant_1),
        }
    }

    /// Unread count of `user_id`, zero for outsiders.
    pub fn unread_for(&self, user_id: &UserId) -> u32 {
        match self.slot_of(user_id) {
            Some(ParticipantSlot::First) => self.unread_count_1,
            Some(ParticipantSlot::Second) => self.unread_count_2,
            None => 0,
        }
    }

    /// Applies a delivered message: preview, timestamp, recipient counter +1.
    pub fn record_message(&mut self, message: &Message) {
        self.last_message_at = Some(message.created_at);
        self.last_message_preview = Some(preview_of(&message.content));
        match self.slot_of(&message.recipient_id) {
            Some(ParticipantSlot::First) => self.unread_count_1 += 1,
            Some(ParticipantSlot::Second) => self.unread_count_2 += 1,
            None => {}
        }
    }

    /// Zeroes the unread counter of `reader`.
    pub fn clear_unread(&mut self, reader: &UserId) {
        match self.slot_of(reader) {
            Some(ParticipantSlot::First) => self.unread_count_1 = 0,
            Some(ParticipantSlot::Second) => self.unread_count_2 = 0,
            None => {}
        }
    }
}

/// Conversation joined with both participants' display profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationWithParticipants {
    pub conversation: Conversation,
    pub participant_1: Option<ParticipantSummary>,
    pub participant_2: Option<ParticipantSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (UserId, UserId, Conversation) {
        let a = UserId::new();
        let b = UserId::new();
        let conversation = Conversation::start(a, b).unwrap();
        (a, b, conversation)
    }

    #[test]
    fn start_rejects_self_conversation() {
        let a = UserId::new();
        assert_eq!(Conversation::start(a, a), Err(MessagingError::SelfConversation));
    }

    #[test]
    fn other_participant_resolves_both_ways() {
        let (a, b, c) = pair();
        assert_eq!(c.other_participant(&a), Some(b));
        assert_eq!(c.other_participant(&b), Some(a));
        assert_eq!(c.other_participant(&UserId::new()), None);
    }

    #[test]
    fn record_message_increments_only_recipient() {
        let (a, b, mut c) = pair();
        let message = Message::compose(c.id, a, b, "hi", None).unwrap();

        c.record_message(&message);
        c.record_message(&message);

        assert_eq!(c.unread_for(&b), 2);
        assert_eq!(c.unread_for(&a), 0);
        assert_eq!(c.last_message_preview.as_deref(), Some("hi"));
        assert_eq!(c.last_message_at, Some(message.created_at));
    }

    #[test]
    fn clear_unread_zeroes_reader_only() {
        let (a, b, mut c) = pair();
        c.unread_count_1 = 3;
        c.unread_count_2 = 4;

        c.clear_unread(&b);

        assert_eq!(c.unread_for(&a), 3);
        assert_eq!(c.unread_for(&b), 0);
    }

    #[test]
    fn preview_truncates_on_character_boundary() {
        let long = "é".repeat(150);
        let preview = preview_of(&long);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS);
        assert_eq!(preview_of("short"), "short");
    }
}
