//! HTTP adapter for messaging endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::MessageResponse;
pub(crate) use handlers::parse_conversation_id;
pub use handlers::MessagingHandlers;
pub use routes::messaging_routes;
