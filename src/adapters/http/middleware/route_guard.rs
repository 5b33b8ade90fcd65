//! Page gateway for browser routes.
//!
//! Runs on every request but only judges page paths: `/api`, `/health` and
//! static assets pass straight through. Member pages require a session and
//! `/admin` requires the admin role; everything else is redirected.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::{session_token, AuthState};
use crate::domain::foundation::AuthenticatedUser;

/// Page prefixes that require a signed-in user.
pub const MEMBER_PAGES: [&str; 4] = ["/dashboard", "/bookings", "/messages", "/profile"];

/// Page prefix restricted to admins.
pub const ADMIN_PAGES: &str = "/admin";

pub const LOGIN_PAGE: &str = "/login";
pub const DASHBOARD_PAGE: &str = "/dashboard";

const PASSTHROUGH_PREFIXES: [&str; 5] = ["/api", "/health", "/_next/static", "/_next/image", "/favicon.ico"];
const ASSET_EXTENSIONS: [&str; 6] = ["svg", "png", "jpg", "jpeg", "gif", "webp"];

/// True for paths the gateway judges.
pub fn is_guarded_path(path: &str) -> bool {
    if PASSTHROUGH_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return false;
    }
    match path.rsplit_once('.') {
        Some((_, ext)) => !ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => true,
    }
}

/// Where to send the caller instead, if anywhere.
pub fn redirect_for(path: &str, user: Option<&AuthenticatedUser>) -> Option<&'static str> {
    if user.is_none() && MEMBER_PAGES.iter().any(|p| path.starts_with(p)) {
        return Some(LOGIN_PAGE);
    }
    if path.starts_with(ADMIN_PAGES) && !user.is_some_and(AuthenticatedUser::is_admin) {
        return Some(DASHBOARD_PAGE);
    }
    None
}

/// Redirecting middleware for page routes.
///
/// An unreadable or rejected token counts as signed out.
pub async fn route_guard(
    State(validator): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !is_guarded_path(&path) {
        return next.run(request).await;
    }

    let user = match session_token(request.headers()) {
        Some(token) => validator.validate(token).await.ok(),
        None => None,
    };

    match redirect_for(&path, user.as_ref()) {
        Some(target) => {
            tracing::debug!(path = %path, target, "Redirecting page request");
            Redirect::temporary(target).into_response()
        }
        None => next.run(request).await,
    }
}
