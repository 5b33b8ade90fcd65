//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what the session validator extracts from a bearer
//! token; `AuthError` is the identity taxonomy shared by the identity provider
//! port, the session validator and the HTTP extractors. Neither type knows
//! which hosted provider sits behind the ports.

use super::{UserId, UserType};
use thiserror::Error;

/// Caller identity extracted from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Identity-provider user id (also the profile id).
    pub id: UserId,

    /// Email address from the token claims.
    pub email: String,

    /// Marketplace role from the token's user metadata.
    pub user_type: UserType,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: impl Into<String>, user_type: UserType) -> Self {
        Self {
            id,
            email: email.into(),
            user_type,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type.is_admin()
    }
}

/// Identity and session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password pair was not accepted.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-up attempted with an email that already has an account.
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token signature is valid but it has expired.
    #[error("Token expired")]
    TokenExpired,

    /// No session accompanies a request that requires one.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Authenticated but lacking the role for this action.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The provider refused the request (weak password, malformed email...).
    #[error("{0}")]
    Rejected(String),

    /// The provider failed in a way we pass through untranslated.
    #[error("Identity provider error: {0}")]
    Upstream(String),

    /// The identity provider is unreachable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The account exists upstream but its profile row could not be written.
    #[error("Profile storage failed: {0}")]
    ProfileStorage(String),
}

impl AuthError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::NotAuthenticated
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
