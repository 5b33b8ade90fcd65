//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `auth` - Session token validation and extractors
//! - `route_guard` - Redirects for member and admin pages

pub mod auth;
pub mod route_guard;

pub use auth::{auth_middleware, session_token, AuthState, OptionalAuth, RequireAuth};
pub use route_guard::route_guard;
