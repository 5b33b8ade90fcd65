//! HTTP handlers for identity endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{auth::ACCESS_TOKEN_COOKIE, session_token, RequireAuth};
use crate::application::handlers::analytics::{TrackEventCommand, TrackEventHandler};
use crate::application::handlers::identity::{
    ChangePasswordCommand, ChangePasswordHandler, GetCurrentSessionHandler,
    GetCurrentSessionQuery, RegisterCommand, RegisterHandler, RequestPasswordResetCommand,
    RequestPasswordResetHandler, SignInCommand, SignInHandler, SignOutCommand, SignOutHandler,
};
use crate::domain::analytics::LOGIN_EVENT;
use crate::domain::foundation::AuthError;

use super::dto::{
    ChangePasswordRequest, MessageResponse, PasswordResetRequest, ProfileResponse,
    RegisterRequest, SessionResponse, SignInRequest, UserResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct IdentityHandlers {
    pub register: Arc<RegisterHandler>,
    pub sign_in: Arc<SignInHandler>,
    pub sign_out: Arc<SignOutHandler>,
    pub request_password_reset: Arc<RequestPasswordResetHandler>,
    pub change_password: Arc<ChangePasswordHandler>,
    pub current_session: Arc<GetCurrentSessionHandler>,
    pub track_event: Arc<TrackEventHandler>,
}

fn bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    session_token(headers)
        .map(str::to_owned)
        .ok_or_else(|| AuthError::NotAuthenticated.into())
}

fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        ACCESS_TOKEN_COOKIE, token
    )
}

fn cleared_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", ACCESS_TOKEN_COOKIE)
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/auth/register
pub async fn register(
    State(handlers): State<IdentityHandlers>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_type = req.role();
    let result = handlers
        .register
        .handle(RegisterCommand {
            email: req.email,
            password: req.password,
            user_type,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(result.profile))))
}

/// POST /api/auth/sign-in
///
/// Records a `login` behaviour event in the background; tracking failures
/// never affect the response.
pub async fn sign_in(
    State(handlers): State<IdentityHandlers>,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .sign_in
        .handle(SignInCommand {
            email: req.email,
            password: req.password,
        })
        .await?;

    let user_id = result.session.user.id;
    let track = handlers.track_event.clone();
    tokio::spawn(async move {
        let cmd = TrackEventCommand {
            event_type: LOGIN_EVENT.to_string(),
            event_data: serde_json::json!({ "method": "password" }),
            user_id: Some(user_id),
        };
        if let Err(err) = track.handle(cmd).await {
            tracing::warn!(user_id = %user_id, error = %err, "Failed to record login event");
        }
    });

    let cookie = session_cookie(&result.session.access_token);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse::from(result.session)),
    ))
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(handlers): State<IdentityHandlers>,
    RequireAuth(_user): RequireAuth,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let access_token = bearer(&headers)?;
    handlers.sign_out.handle(SignOutCommand { access_token }).await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cleared_session_cookie())]),
        Json(MessageResponse::new("Signed out")),
    ))
}

/// POST /api/auth/password-reset
pub async fn request_password_reset(
    State(handlers): State<IdentityHandlers>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    handlers
        .request_password_reset
        .handle(RequestPasswordResetCommand { email: req.email })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Password reset email sent")),
    ))
}

/// PUT /api/auth/password
pub async fn change_password(
    State(handlers): State<IdentityHandlers>,
    RequireAuth(_user): RequireAuth,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let access_token = bearer(&headers)?;
    handlers
        .change_password
        .handle(ChangePasswordCommand {
            access_token,
            new_password: req.new_password,
        })
        .await?;

    Ok(Json(MessageResponse::new("Password updated")))
}

/// GET /api/auth/session
pub async fn current_session(
    State(handlers): State<IdentityHandlers>,
    RequireAuth(_user): RequireAuth,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let access_token = bearer(&headers)?;
    let result = handlers
        .current_session
        .handle(GetCurrentSessionQuery { access_token })
        .await?;

    Ok(Json(UserResponse::from(result.user)))
}
