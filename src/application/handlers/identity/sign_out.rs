//! SignOutHandler - Command handler for revoking the caller's session.

use std::sync::Arc;

use crate::domain::foundation::AuthError;
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
pub struct SignOutCommand {
    pub access_token: String,
}

pub struct SignOutHandler {
    identity: Arc<dyn IdentityProvider>,
}

impl SignOutHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn handle(&self, cmd: SignOutCommand) -> Result<(), AuthError> {
        if cmd.access_token.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }
        self.identity.sign_out(&cmd.access_token).await
    }
}
