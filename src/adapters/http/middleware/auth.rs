//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that validates the session token and injects the user into extensions
//! - `RequireAuth` - Extractor that requires authentication
//! - `OptionalAuth` - Extractor for optional authentication
//!
//! # Architecture
//!
//! The middleware uses the `SessionValidator` port, so the hosted provider,
//! local JWT validation and the test mock are interchangeable.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Cookie carrying the access token for browser requests.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Reads the session token from the `Authorization: Bearer` header, falling
/// back to the `access_token` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// A valid token injects `AuthenticatedUser` into request extensions. A
/// missing token passes through untouched so handlers decide with
/// `RequireAuth` or `OptionalAuth`. An invalid or expired token is a 401.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers()).map(str::to_owned);

    match token {
        Some(token) => match validator.validate(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            Err(err) => {
                if let AuthError::ServiceUnavailable(msg) = &err {
                    tracing::error!("Auth service unavailable: {}", msg);
                } else {
                    tracing::debug!(error = %err, "Rejected session token");
                }
                ApiError::from(err).into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor that requires authentication.
///
/// Fails with 401 when the auth middleware did not inject a user.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| ApiError::from(AuthError::NotAuthenticated))
    }
}

/// Extractor for optional authentication.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::{UserId, UserType};
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "test@example.com", UserType::Client)
    }

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), value.parse().unwrap());
        }
        map
    }

    fn app(validator: MockSessionValidator) -> Router {
        let state: AuthState = Arc::new(validator);
        Router::new()
            .route(
                "/me",
                get(|RequireAuth(user): RequireAuth| async move { user.email }),
            )
            .route(
                "/maybe",
                get(|OptionalAuth(user): OptionalAuth| async move {
                    user.map(|u| u.email).unwrap_or_else(|| "guest".to_string())
                }),
            )
            .layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "access_token=from-cookie"),
        ]);
        assert_eq!(session_token(&map), Some("from-header"));
    }

    #[test]
    fn cookie_is_used_without_bearer() {
        let map = headers(&[(header::COOKIE, "theme=dark; access_token=abc; other=1")]);
        assert_eq!(session_token(&map), Some("abc"));
    }

    #[test]
    fn non_bearer_schemes_are_ignored() {
        let map = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert_eq!(session_token(&map), None);
        assert_eq!(session_token(&headers(&[(header::COOKIE, "access_token=")])), None);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let validator = MockSessionValidator::new().with_user("good", test_user());

        let response = app(validator)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_401_only_where_required() {
        let response = app(MockSessionValidator::new())
            .oneshot(axum::http::Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(MockSessionValidator::new())
            .oneshot(axum::http::Request::builder().uri("/maybe").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let response = app(MockSessionValidator::new())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/maybe")
                    .header(header::COOKIE, "access_token=forged")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn extractors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
        assert_send_sync::<RequireAuth>();
        assert_send_sync::<OptionalAuth>();
    }
}
