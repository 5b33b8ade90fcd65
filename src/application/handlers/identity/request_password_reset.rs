//! RequestPasswordResetHandler - Command handler for sending a reset link.

use std::sync::Arc;

use crate::domain::foundation::AuthError;
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
pub struct RequestPasswordResetCommand {
    pub email: String,
}

/// Handler for password reset requests.
///
/// The provider emails a link that lands on the site's reset page.
pub struct RequestPasswordResetHandler {
    identity: Arc<dyn IdentityProvider>,
    redirect_to: String,
}

impl RequestPasswordResetHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, redirect_to: impl Into<String>) -> Self {
        Self {
            identity,
            redirect_to: redirect_to.into(),
        }
    }

    pub async fn handle(&self, cmd: RequestPasswordResetCommand) -> Result<(), AuthError> {
        let email = cmd.email.trim();
        if email.is_empty() {
            return Err(AuthError::rejected("Email is required"));
        }
        self.identity
            .send_password_reset(email, &self.redirect_to)
            .await
    }
}
