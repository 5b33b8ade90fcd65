//! Hosted identity provider adapter.
//!
//! Implements `IdentityProvider` against a GoTrue-compatible REST API mounted
//! at `{url}/auth/v1`. Every request carries the project's `apikey` header;
//! user-scoped calls add the caller's bearer token, and the admin delete uses
//! the service-role key.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, Timestamp, UserId, UserType};
use crate::ports::{IdentityProvider, IdentityUser, Session, SignUpRequest};

/// Connection settings for the hosted identity API.
#[derive(Clone)]
pub struct HostedIdentityConfig {
    base_url: String,
    anon_key: SecretString,
    service_role_key: SecretString,
    timeout: Duration,
}

impl HostedIdentityConfig {
    pub fn new(
        project_url: impl Into<String>,
        anon_key: SecretString,
        service_role_key: SecretString,
    ) -> Self {
        let project_url = project_url.into();
        Self {
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            anon_key,
            service_role_key,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self::new(
            config.url.clone(),
            config.anon_key.clone(),
            config.service_role_key.clone(),
        )
        .with_timeout(config.timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// GoTrue user object.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    user_type: Option<String>,
}

/// `POST /token` response, also returned by `signup` when auto-confirm is on.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: ProviderUser,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(ProviderUser),
}

/// Error bodies vary between GoTrue versions; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ProviderErrorBody {
    fn text(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
    }

    fn is_duplicate_email(&self) -> bool {
        matches!(
            self.error_code.as_deref(),
            Some("user_already_exists") | Some("email_exists")
        ) || self
            .text()
            .is_some_and(|t| t.to_ascii_lowercase().contains("already registered"))
    }

    fn is_invalid_credentials(&self) -> bool {
        matches!(self.error_code.as_deref(), Some("invalid_credentials"))
            || self.error.as_deref() == Some("invalid_grant")
    }
}

/// Which call failed; drives error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    SignUp,
    SignIn,
    UserScoped,
    Other,
}

fn classify_error(operation: Operation, status: StatusCode, body: &str) -> AuthError {
    let parsed: ProviderErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .text()
        .map(str::to_string)
        .unwrap_or_else(|| format!("identity provider returned {}", status));

    if status.is_server_error() {
        return AuthError::upstream(message);
    }
    match operation {
        Operation::SignUp if parsed.is_duplicate_email() => AuthError::EmailAlreadyRegistered,
        Operation::SignIn if parsed.is_invalid_credentials() || status == StatusCode::BAD_REQUEST => {
            AuthError::InvalidCredentials
        }
        Operation::UserScoped
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
        {
            AuthError::InvalidToken
        }
        _ if status == StatusCode::TOO_MANY_REQUESTS => AuthError::upstream(message),
        _ => AuthError::rejected(message),
    }
}

fn to_identity_user(user: ProviderUser) -> Result<IdentityUser, AuthError> {
    let id: UserId = user
        .id
        .parse()
        .map_err(|_| AuthError::upstream(format!("identity provider returned bad user id {}", user.id)))?;
    let user_type = user
        .user_metadata
        .user_type
        .as_deref()
        .and_then(|raw| raw.parse::<UserType>().ok());
    Ok(IdentityUser {
        id,
        email: user.email.unwrap_or_default(),
        user_type,
        created_at: user.created_at.map(Timestamp::from_datetime),
    })
}

fn to_session(tokens: TokenResponse) -> Result<Session, AuthError> {
    let expires_at = match (tokens.expires_at, tokens.expires_in) {
        (Some(at), _) => Timestamp::from_unix_secs(at),
        (None, Some(seconds)) => Timestamp::from_unix_secs(Timestamp::now().as_unix_secs() + seconds),
        (None, None) => None,
    };
    Ok(Session {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at,
        user: to_identity_user(tokens.user)?,
    })
}

/// GoTrue-compatible identity provider client.
pub struct HostedIdentityProvider {
    config: HostedIdentityConfig,
    http_client: reqwest::Client,
}

impl HostedIdentityProvider {
    pub fn new(config: HostedIdentityConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn public(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", self.config.anon_key.expose_secret())
    }

    fn as_user(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        self.public(builder).bearer_auth(access_token)
    }

    async fn execute(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, AuthError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "identity provider unreachable");
            AuthError::service_unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let error = classify_error(operation, status, &body);
        if status.is_server_error() {
            tracing::error!(status = %status, ?operation, "identity provider request failed");
        } else {
            tracing::debug!(status = %status, ?operation, error = %error, "identity request rejected");
        }
        Err(error)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        response
            .json()
            .await
            .map_err(|e| AuthError::upstream(format!("unexpected identity response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<IdentityUser, AuthError> {
        let body = json!({
            "email": request.email,
            "password": request.password.expose_secret(),
            "data": { "user_type": request.user_type.as_str() },
        });
        let response = self
            .execute(
                Operation::SignUp,
                self.public(self.http_client.post(self.config.endpoint("signup")))
                    .json(&body),
            )
            .await?;
        match Self::read_json::<SignUpResponse>(response).await? {
            SignUpResponse::Session(tokens) => to_identity_user(tokens.user),
            SignUpResponse::User(user) => to_identity_user(user),
        }
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        let body = json!({ "email": email, "password": password.expose_secret() });
        let response = self
            .execute(
                Operation::SignIn,
                self.public(self.http_client.post(self.config.endpoint("token")))
                    .query(&[("grant_type", "password")])
                    .json(&body),
            )
            .await?;
        to_session(Self::read_json(response).await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.execute(
            Operation::UserScoped,
            self.as_user(
                self.http_client.post(self.config.endpoint("logout")),
                access_token,
            ),
        )
        .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.execute(
            Operation::Other,
            self.public(self.http_client.post(self.config.endpoint("recover")))
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &SecretString,
    ) -> Result<(), AuthError> {
        self.execute(
            Operation::UserScoped,
            self.as_user(
                self.http_client.put(self.config.endpoint("user")),
                access_token,
            )
            .json(&json!({ "password": new_password.expose_secret() })),
        )
        .await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<IdentityUser, AuthError> {
        let response = self
            .execute(
                Operation::UserScoped,
                self.as_user(
                    self.http_client.get(self.config.endpoint("user")),
                    access_token,
                ),
            )
            .await?;
        to_identity_user(Self::read_json(response).await?)
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), AuthError> {
        let service_key = self.config.service_role_key.expose_secret();
        self.execute(
            Operation::Other,
            self.http_client
                .delete(self.config.endpoint(&format!("admin/users/{}", user_id)))
                .header("apikey", service_key)
                .bearer_auth(service_key),
        )
        .await?;
        Ok(())
    }
}

impl std::fmt::Debug for HostedIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedIdentityProvider")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HostedIdentityConfig {
        HostedIdentityConfig::new(
            "https://project.auth.example.com/",
            SecretString::new("anon".to_string()),
            SecretString::new("service".to_string()),
        )
    }

    #[test]
    fn endpoints_live_under_auth_v1() {
        assert_eq!(
            config().endpoint("token"),
            "https://project.auth.example.com/auth/v1/token"
        );
        assert_eq!(
            config().endpoint("admin/users/abc"),
            "https://project.auth.example.com/auth/v1/admin/users/abc"
        );
    }

    #[test]
    fn duplicate_signup_maps_to_email_already_registered() {
        let body = r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#;
        assert_eq!(
            classify_error(Operation::SignUp, StatusCode::UNPROCESSABLE_ENTITY, body),
            AuthError::EmailAlreadyRegistered
        );
    }

    #[test]
    fn legacy_duplicate_message_is_recognized() {
        let body = r#"{"msg":"User already registered"}"#;
        assert_eq!(
            classify_error(Operation::SignUp, StatusCode::BAD_REQUEST, body),
            AuthError::EmailAlreadyRegistered
        );
    }

    #[test]
    fn weak_password_is_rejected_with_provider_message() {
        let body = r#"{"code":422,"error_code":"weak_password","msg":"Password should be at least 6 characters"}"#;
        assert_eq!(
            classify_error(Operation::SignUp, StatusCode::UNPROCESSABLE_ENTITY, body),
            AuthError::rejected("Password should be at least 6 characters")
        );
    }

    #[test]
    fn bad_login_maps_to_invalid_credentials() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            classify_error(Operation::SignIn, StatusCode::BAD_REQUEST, body),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn unauthorized_user_call_maps_to_invalid_token() {
        assert_eq!(
            classify_error(Operation::UserScoped, StatusCode::UNAUTHORIZED, ""),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn server_errors_pass_message_through() {
        let body = r#"{"message":"database unavailable"}"#;
        assert_eq!(
            classify_error(Operation::SignIn, StatusCode::SERVICE_UNAVAILABLE, body),
            AuthError::upstream("database unavailable")
        );
    }

    #[test]
    fn token_response_maps_to_session() {
        let json = r#"{
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1700000000,
            "refresh_token": "refresh",
            "user": {
                "id": "6f1c1f0e-8a4b-4c1e-9a57-3f0f3c9b9b11",
                "email": "ana@example.com",
                "user_metadata": {"user_type": "companion"},
                "created_at": "2024-01-01T00:00:00Z"
            }
        }"#;
        let tokens: TokenResponse = serde_json::from_str(json).unwrap();
        let session = to_session(tokens).unwrap();

        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.refresh_token, "refresh");
        assert_eq!(session.expires_at.map(|t| t.as_unix_secs()), Some(1_700_000_000));
        assert_eq!(session.user.email, "ana@example.com");
        assert_eq!(session.user.user_type, Some(UserType::Companion));
    }

    #[test]
    fn signup_response_accepts_bare_user() {
        let json = r#"{"id":"6f1c1f0e-8a4b-4c1e-9a57-3f0f3c9b9b11","email":"ana@example.com","user_metadata":{}}"#;
        let parsed: SignUpResponse = serde_json::from_str(json).unwrap();
        let SignUpResponse::User(user) = parsed else {
            panic!("expected bare user");
        };
        let user = to_identity_user(user).unwrap();
        assert_eq!(user.user_type, None);
    }

    #[test]
    fn non_uuid_user_id_is_upstream_error() {
        let user = ProviderUser {
            id: "not-a-uuid".to_string(),
            email: None,
            user_metadata: UserMetadata::default(),
            created_at: None,
        };
        assert!(matches!(to_identity_user(user), Err(AuthError::Upstream(_))));
    }
}
