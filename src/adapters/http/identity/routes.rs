//! HTTP routes for identity endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    change_password, current_session, register, request_password_reset, sign_in, sign_out,
    IdentityHandlers,
};

/// Creates the identity router, mounted under `/api/auth`.
pub fn identity_routes(handlers: IdentityHandlers) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
        .route("/password-reset", post(request_password_reset))
        .route("/password", put(change_password))
        .route("/session", get(current_session))
        .with_state(handlers)
}
