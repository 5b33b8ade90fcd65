//! Identity provider port.
//!
//! The marketplace never stores credentials. Sign-up, sign-in, password
//! management and session revocation are delegated to a hosted identity
//! provider reachable through this port.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::{AuthError, Timestamp, UserId, UserType};

/// A user record as the identity provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub id: UserId,
    pub email: String,
    /// Role stored in the provider's user metadata at sign-up.
    pub user_type: Option<UserType>,
    pub created_at: Option<Timestamp>,
}

/// Tokens issued by a successful sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<Timestamp>,
    pub user: IdentityUser,
}

/// Credentials for a new account.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: SecretString,
    pub user_type: UserType,
}

/// Hosted identity provider.
///
/// # Contract
///
/// - `sign_up` returns `EmailAlreadyRegistered` for duplicate emails and
///   `Rejected` for credentials the provider refuses
/// - `sign_in` returns `InvalidCredentials` for a bad email/password pair
/// - token-scoped calls return `InvalidToken` / `TokenExpired` when the access
///   token is not accepted
/// - transport failures surface as `ServiceUnavailable`
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account, storing `user_type` as user metadata.
    async fn sign_up(&self, request: SignUpRequest) -> Result<IdentityUser, AuthError>;

    /// Exchanges an email/password pair for a session.
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError>;

    /// Revokes the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Emails a reset link that lands on `redirect_to`.
    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    /// Changes the password of the user behind `access_token`.
    async fn update_password(
        &self,
        access_token: &str,
        new_password: &SecretString,
    ) -> Result<(), AuthError>;

    /// Returns the provider's view of the user behind `access_token`.
    async fn get_user(&self, access_token: &str) -> Result<IdentityUser, AuthError>;

    /// Deletes an account with administrative privileges.
    ///
    /// Used to undo a sign-up whose profile row could not be written.
    async fn delete_user(&self, user_id: &UserId) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_provider_is_object_safe_and_send_sync() {
        fn _accepts_dyn(_provider: &dyn IdentityProvider) {}
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<std::sync::Arc<dyn IdentityProvider>>();
    }
}
