//! RegisterHandler - Command handler for creating an account and its profile.

use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::foundation::{AuthError, UserType};
use crate::domain::profile::Profile;
use crate::ports::{IdentityProvider, ProfileRepository, SignUpRequest};

/// Command to register a new marketplace user.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: SecretString,
    pub user_type: UserType,
}

#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub profile: Profile,
}

/// Handler for registration.
///
/// Sign-up and the profile insert span two systems. If the insert fails the
/// freshly created identity record is deleted again, so no account exists
/// without a profile, and the insert error is returned.
pub struct RegisterHandler {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
}

impl RegisterHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { identity, profiles }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<RegisterResult, AuthError> {
        let email = cmd.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::rejected("A valid email address is required"));
        }
        if cmd.user_type.is_admin() {
            return Err(AuthError::rejected("Admin accounts cannot be self-registered"));
        }

        let user = self
            .identity
            .sign_up(SignUpRequest {
                email,
                password: cmd.password,
                user_type: cmd.user_type,
            })
            .await?;

        let profile = Profile::for_new_user(user.id, user.email, cmd.user_type);
        if let Err(err) = self.profiles.insert(&profile).await {
            tracing::warn!(
                user_id = %profile.id,
                error = %err,
                "Profile insert failed after sign-up, deleting identity record"
            );
            if let Err(cleanup) = self.identity.delete_user(&profile.id).await {
                tracing::error!(
                    user_id = %profile.id,
                    error = %cleanup,
                    "Compensating identity delete failed"
                );
            }
            return Err(AuthError::ProfileStorage(err.to_string()));
        }

        tracing::info!(user_id = %profile.id, user_type = %profile.user_type, "User registered");

        Ok(RegisterResult { profile })
    }
}
