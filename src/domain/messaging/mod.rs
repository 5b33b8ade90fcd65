//! Messaging domain module.
//!
//! - `conversation` - two-party conversation and unread counter rules
//! - `message` - chat messages and read receipts
//! - `errors` - MessagingError taxonomy

mod conversation;
mod errors;
mod message;

pub use conversation::{
    preview_of, Conversation, ConversationWithParticipants, ParticipantSlot, PREVIEW_CHARS,
};
pub use errors::MessagingError;
pub use message::{Message, DEFAULT_MESSAGE_TYPE};
