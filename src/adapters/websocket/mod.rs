//! WebSocket adapters for live conversation delivery.
//!
//! # Architecture
//!
//! ```text
//! SendMessageHandler ──commit──▶ ConversationRepository
//!         │
//!         │ publish
//!         ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ConversationRooms                         │
//! │   Room: conv-123       Room: conv-456                        │
//! │   ├── subscriber-a     └── subscriber-c                      │
//! │   └── subscriber-b                                           │
//! └─────────────────────────────────────────────────────────────┘
//!         │
//!         │ LiveSubscription (backfill + live, deduplicated)
//!         ▼
//!   ws_handler ──frames──▶ browser
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket frame types
//! - [`rooms`] - Per-conversation broadcast rooms (`MessageFeed`)
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod rooms;

pub use handler::{live_routes, ws_handler, LiveQuery, WebSocketState};
pub use messages::{
    ClientMessage, ConnectedMessage, ErrorMessage, LaggedMessage, PongMessage, ServerMessage,
};
pub use rooms::{ConversationRooms, DEFAULT_CHANNEL_CAPACITY};
