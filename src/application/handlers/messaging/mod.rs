//! Messaging handlers.
//!
//! ## Commands
//! - Opening a conversation with another user
//! - Sending a message (stored, counted, then published live)
//! - Marking the caller's messages read
//!
//! ## Queries
//! - Listing the caller's conversations
//! - Subscribing to a conversation's live messages, optionally resuming
//!   after the last seen message

mod list_conversations;
mod mark_read;
mod open_conversation;
mod send_message;
mod subscribe_to_conversation;

// Commands
pub use mark_read::{MarkReadCommand, MarkReadHandler, MarkReadResult};
pub use open_conversation::{
    OpenConversationCommand, OpenConversationHandler, OpenConversationResult,
};
pub use send_message::{SendMessageCommand, SendMessageHandler, SendMessageResult};

// Queries
pub use list_conversations::{
    ListConversationsHandler, ListConversationsQuery, ListConversationsResult,
};
pub use subscribe_to_conversation::{
    LiveEvent, LiveSubscription, SubscribeToConversationCommand, SubscribeToConversationHandler,
};
