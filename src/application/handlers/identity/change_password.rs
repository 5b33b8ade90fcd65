//! ChangePasswordHandler - Command handler for the signed-in user's password.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::AuthError;
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
pub struct ChangePasswordCommand {
    pub access_token: String,
    pub new_password: SecretString,
}

pub struct ChangePasswordHandler {
    identity: Arc<dyn IdentityProvider>,
}

impl ChangePasswordHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn handle(&self, cmd: ChangePasswordCommand) -> Result<(), AuthError> {
        if cmd.access_token.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }
        if cmd.new_password.expose_secret().is_empty() {
            return Err(AuthError::rejected("New password is required"));
        }
        self.identity
            .update_password(&cmd.access_token, &cmd.new_password)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockIdentityProvider;
    use crate::domain::foundation::UserType;
    use crate::ports::SignUpRequest;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[tokio::test]
    async fn new_password_works_for_next_sign_in() {
        let identity = Arc::new(MockIdentityProvider::new());
        identity
            .sign_up(SignUpRequest {
                email: "rotate@example.com".to_string(),
                password: secret("old-password"),
                user_type: UserType::Companion,
            })
            .await
            .unwrap();
        let session = identity
            .sign_in("rotate@example.com", &secret("old-password"))
            .await
            .unwrap();

        ChangePasswordHandler::new(identity.clone())
            .handle(ChangePasswordCommand {
                access_token: session.access_token,
                new_password: secret("new-password"),
            })
            .await
            .unwrap();

        assert!(identity
            .sign_in("rotate@example.com", &secret("new-password"))
            .await
            .is_ok());
        assert_eq!(
            identity
                .sign_in("rotate@example.com", &secret("old-password"))
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let handler = ChangePasswordHandler::new(Arc::new(MockIdentityProvider::new()));

        let err = handler
            .handle(ChangePasswordCommand {
                access_token: "stale".to_string(),
                new_password: secret("whatever1"),
            })
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidToken);
    }
}
