//! Mock identity adapters for testing.
//!
//! These adapters implement the `SessionValidator` and `IdentityProvider`
//! ports for use in tests, avoiding the need for a hosted identity service.
//!
//! # Example
//!
//! ```ignore
//! use companion_market::adapters::auth::MockSessionValidator;
//! use companion_market::domain::foundation::{AuthenticatedUser, UserId, UserType};
//!
//! let validator = MockSessionValidator::new().with_user(
//!     "valid-token",
//!     AuthenticatedUser::new(UserId::new(), "test@example.com", UserType::Client),
//! );
//!
//! let result = validator.validate("valid-token").await;
//! assert!(result.is_ok());
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId, UserType};
use crate::ports::{IdentityProvider, IdentityUser, Session, SessionValidator, SignUpRequest};

/// Mock session validator for testing.
///
/// Stores a map of tokens to users. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Optional error to return for all validations
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a valid token for a fresh user of the given type, returning its id.
    pub fn add_test_user(&self, token: impl Into<String>, user_type: UserType) -> UserId {
        let id = UserId::new();
        self.add_token(
            token,
            AuthenticatedUser::new(id, format!("{}@test.example.com", id), user_type),
        );
        id
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), user);
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

struct Account {
    user: IdentityUser,
    password: String,
}

#[derive(Default)]
struct ProviderState {
    /// Accounts keyed by lowercase email.
    accounts: HashMap<String, Account>,
    /// Live sessions: access token to email.
    sessions: HashMap<String, String>,
    /// Emails that were sent a reset link, with the redirect target.
    reset_requests: Vec<(String, String)>,
    deleted: HashSet<UserId>,
    method_errors: HashMap<String, AuthError>,
    sequence: u64,
}

/// In-memory identity provider for testing.
///
/// Issues opaque access tokens on sign-in and also validates them, so a single
/// instance can back both the identity handlers and the auth middleware.
#[derive(Default)]
pub struct MockIdentityProvider {
    state: Mutex<ProviderState>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every call to `method` fail with `error`.
    pub fn set_method_error(&self, method: &str, error: AuthError) {
        self.state()
            .method_errors
            .insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        self.state().method_errors.clear();
    }

    /// Accounts removed through `delete_user`.
    pub fn deleted_users(&self) -> HashSet<UserId> {
        self.state().deleted.clone()
    }

    /// Number of accounts still registered.
    pub fn account_count(&self) -> usize {
        self.state().accounts.len()
    }

    /// Password reset requests as (email, redirect_to).
    pub fn reset_requests(&self) -> Vec<(String, String)> {
        self.state().reset_requests.clone()
    }

    pub fn has_session(&self, access_token: &str) -> bool {
        self.state().sessions.contains_key(access_token)
    }

    fn check_error(&self, method: &str) -> Result<(), AuthError> {
        match self.state().method_errors.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn user_for_token(&self, access_token: &str) -> Result<IdentityUser, AuthError> {
        let state = self.state();
        let email = state
            .sessions
            .get(access_token)
            .ok_or(AuthError::InvalidToken)?;
        state
            .accounts
            .get(email)
            .map(|account| account.user.clone())
            .ok_or(AuthError::InvalidToken)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<IdentityUser, AuthError> {
        self.check_error("sign_up")?;
        if request.password.expose_secret().len() < 6 {
            return Err(AuthError::rejected(
                "Password should be at least 6 characters",
            ));
        }

        let key = request.email.to_ascii_lowercase();
        let mut state = self.state();
        if state.accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        let user = IdentityUser {
            id: UserId::new(),
            email: request.email,
            user_type: Some(request.user_type),
            created_at: Some(Timestamp::now()),
        };
        state.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: request.password.expose_secret().clone(),
            },
        );
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        self.check_error("sign_in")?;
        let key = email.to_ascii_lowercase();
        let mut state = self.state();
        let user = match state.accounts.get(&key) {
            Some(account) if account.password == *password.expose_secret() => {
                account.user.clone()
            }
            _ => return Err(AuthError::InvalidCredentials),
        };

        state.sequence += 1;
        let access_token = format!("access-{}-{}", user.id, state.sequence);
        state.sessions.insert(access_token.clone(), key);
        Ok(Session {
            refresh_token: format!("refresh-{}", state.sequence),
            access_token,
            expires_at: Some(Timestamp::now().plus_hours(1)),
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.check_error("sign_out")?;
        match self.state().sessions.remove(access_token) {
            Some(_) => Ok(()),
            None => Err(AuthError::InvalidToken),
        }
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.check_error("send_password_reset")?;
        self.state()
            .reset_requests
            .push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &SecretString,
    ) -> Result<(), AuthError> {
        self.check_error("update_password")?;
        let user = self.user_for_token(access_token)?;
        let key = user.email.to_ascii_lowercase();
        if let Some(account) = self.state().accounts.get_mut(&key) {
            account.password = new_password.expose_secret().clone();
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<IdentityUser, AuthError> {
        self.check_error("get_user")?;
        self.user_for_token(access_token)
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), AuthError> {
        self.check_error("delete_user")?;
        let mut state = self.state();
        state.accounts.retain(|_, account| account.user.id != *user_id);
        let ProviderState {
            accounts, sessions, ..
        } = &mut *state;
        sessions.retain(|_, email| accounts.contains_key(email));
        state.deleted.insert(*user_id);
        Ok(())
    }
}

#[async_trait]
impl SessionValidator for MockIdentityProvider {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let user = self.user_for_token(token)?;
        Ok(AuthenticatedUser::new(
            user.id,
            user.email,
            user.user_type.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    fn signup(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: secret("hunter22"),
            user_type: UserType::Companion,
        }
    }

    #[tokio::test]
    async fn validator_returns_user_for_known_token() {
        let validator = MockSessionValidator::new();
        let id = validator.add_test_user("good", UserType::Admin);

        let user = validator.validate("good").await.unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_admin());
        assert_eq!(
            validator.validate("bad").await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let validator = MockSessionValidator::new()
            .with_error(AuthError::service_unavailable("down"));
        validator.add_test_user("good", UserType::Client);
        assert!(matches!(
            validator.validate("good").await,
            Err(AuthError::ServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_issues_validatable_token() {
        let provider = MockIdentityProvider::new();
        let user = provider.sign_up(signup("ana@example.com")).await.unwrap();

        let session = provider
            .sign_in("ana@example.com", &secret("hunter22"))
            .await
            .unwrap();
        let authenticated = provider.validate(&session.access_token).await.unwrap();

        assert_eq!(authenticated.id, user.id);
        assert_eq!(authenticated.user_type, UserType::Companion);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let provider = MockIdentityProvider::new();
        provider.sign_up(signup("ana@example.com")).await.unwrap();
        assert_eq!(
            provider.sign_up(signup("ANA@example.com")).await,
            Err(AuthError::EmailAlreadyRegistered)
        );
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let provider = MockIdentityProvider::new();
        provider.sign_up(signup("ana@example.com")).await.unwrap();
        assert!(matches!(
            provider.sign_in("ana@example.com", &secret("nope")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn sign_out_revokes_token() {
        let provider = MockIdentityProvider::new();
        provider.sign_up(signup("ana@example.com")).await.unwrap();
        let session = provider
            .sign_in("ana@example.com", &secret("hunter22"))
            .await
            .unwrap();

        provider.sign_out(&session.access_token).await.unwrap();

        assert!(!provider.has_session(&session.access_token));
        assert_eq!(
            provider.get_user(&session.access_token).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn delete_user_removes_account() {
        let provider = MockIdentityProvider::new();
        let user = provider.sign_up(signup("ana@example.com")).await.unwrap();

        provider.delete_user(&user.id).await.unwrap();

        assert_eq!(provider.account_count(), 0);
        assert!(provider.deleted_users().contains(&user.id));
    }
}
