//! HTTP routes for messaging endpoints.

use axum::{routing::post, Router};

use super::handlers::{
    list_conversations, mark_read, open_conversation, send_message, MessagingHandlers,
};

/// Creates the messaging router, mounted under `/api/conversations`.
///
/// The live WebSocket route is served by the websocket adapter.
pub fn messaging_routes(handlers: MessagingHandlers) -> Router {
    Router::new()
        .route("/", post(open_conversation).get(list_conversations))
        .route("/:id/messages", post(send_message))
        .route("/:id/read", post(mark_read))
        .with_state(handlers)
}
