//! WebSocket frame types for live conversation delivery.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, messages, lag notices, errors, pongs
//! - Client → Server: pings

use serde::{Deserialize, Serialize};

use crate::adapters::http::messaging::MessageResponse;
use crate::application::handlers::messaging::LiveEvent;
use crate::domain::foundation::Timestamp;

// ============================================
// Server → Client Messages
// ============================================

/// All frames that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription established; backfill (if any) follows.
    Connected(ConnectedMessage),

    /// A message in the conversation, in insertion order.
    Message(MessageResponse),

    /// The client fell behind and missed messages. It should reconnect with
    /// `after=<last seen id>`.
    Lagged(LaggedMessage),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectedMessage {
    pub conversation_id: String,
    pub subscriber_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaggedMessage {
    pub missed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl ServerMessage {
    pub fn pong() -> Self {
        ServerMessage::Pong(PongMessage {
            timestamp: now_rfc3339(),
        })
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorMessage {
            code: code.into(),
            message: message.into(),
            timestamp: now_rfc3339(),
        })
    }
}

impl From<LiveEvent> for ServerMessage {
    fn from(event: LiveEvent) -> Self {
        match event {
            LiveEvent::Message(message) => ServerMessage::Message(message.into()),
            LiveEvent::Lagged { missed } => ServerMessage::Lagged(LaggedMessage { missed }),
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    Timestamp::now().as_datetime().to_rfc3339()
}

// ============================================
// Client → Server Messages
// ============================================

/// All frames that can be received from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,
}
