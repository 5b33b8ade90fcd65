//! SignInHandler - Command handler for email/password sign-in.

use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::foundation::AuthError;
use crate::ports::{IdentityProvider, Session};

/// Command to sign in.
#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct SignInResult {
    pub session: Session,
}

/// Handler for sign-in. Exchanges credentials for provider-issued tokens.
pub struct SignInHandler {
    identity: Arc<dyn IdentityProvider>,
}

impl SignInHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn handle(&self, cmd: SignInCommand) -> Result<SignInResult, AuthError> {
        let session = self
            .identity
            .sign_in(cmd.email.trim(), &cmd.password)
            .await?;

        tracing::info!(user_id = %session.user.id, "User signed in");

        Ok(SignInResult { session })
    }
}
