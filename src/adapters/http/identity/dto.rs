//! HTTP DTOs for identity endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserType;
use crate::domain::profile::Profile;
use crate::ports::{IdentityUser, Session};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: SecretString,
    #[serde(default)]
    pub user_type: Option<String>,
}

impl RegisterRequest {
    /// Missing or unknown roles register as clients.
    pub fn role(&self) -> UserType {
        match self.user_type.as_deref() {
            None => UserType::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(user_type = raw, "Unknown user_type at sign-up, using client");
                UserType::default()
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: SecretString,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            email: profile.email,
            user_type: profile.user_type,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            created_at: profile.created_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
}

impl From<IdentityUser> for UserResponse {
    fn from(user: IdentityUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            user_type: user.user_type.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at.map(|t| t.as_datetime().to_rfc3339()),
            user: session.user.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn register(user_type: Option<&str>) -> RegisterRequest {
        let json = match user_type {
            Some(t) => format!(r#"{{"email":"a@example.com","password":"pw123456","user_type":"{}"}}"#, t),
            None => r#"{"email":"a@example.com","password":"pw123456"}"#.to_string(),
        };
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn register_role_defaults_to_client() {
        assert_eq!(register(None).role(), UserType::Client);
        assert_eq!(register(Some("superuser")).role(), UserType::Client);
        assert_eq!(register(Some("companion")).role(), UserType::Companion);
        assert_eq!(register(Some("admin")).role(), UserType::Admin);
    }

    #[test]
    fn user_without_role_serializes_as_client() {
        let response = UserResponse::from(IdentityUser {
            id: UserId::new(),
            email: "a@example.com".to_string(),
            user_type: None,
            created_at: None,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["user_type"], "client");
    }
}
