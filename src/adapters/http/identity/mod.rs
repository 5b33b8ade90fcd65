//! HTTP adapter for identity endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{ProfileResponse, SessionResponse, UserResponse};
pub use handlers::IdentityHandlers;
pub use routes::identity_routes;
