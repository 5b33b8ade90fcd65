//! GetCurrentSessionHandler - Query handler for the provider's view of the caller.

use std::sync::Arc;

use crate::domain::foundation::AuthError;
use crate::ports::{IdentityProvider, IdentityUser};

#[derive(Debug, Clone)]
pub struct GetCurrentSessionQuery {
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct GetCurrentSessionResult {
    pub user: IdentityUser,
}

pub struct GetCurrentSessionHandler {
    identity: Arc<dyn IdentityProvider>,
}

impl GetCurrentSessionHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn handle(
        &self,
        query: GetCurrentSessionQuery,
    ) -> Result<GetCurrentSessionResult, AuthError> {
        if query.access_token.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }
        let user = self.identity.get_user(&query.access_token).await?;
        Ok(GetCurrentSessionResult { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockIdentityProvider;
    use crate::domain::foundation::UserType;
    use crate::ports::SignUpRequest;
    use secrecy::SecretString;

    #[tokio::test]
    async fn returns_user_behind_token() {
        let identity = Arc::new(MockIdentityProvider::new());
        let password = SecretString::new("password1".to_string());
        let created = identity
            .sign_up(SignUpRequest {
                email: "me@example.com".to_string(),
                password: password.clone(),
                user_type: UserType::Companion,
            })
            .await
            .unwrap();
        let session = identity.sign_in("me@example.com", &password).await.unwrap();

        let result = GetCurrentSessionHandler::new(identity)
            .handle(GetCurrentSessionQuery {
                access_token: session.access_token,
            })
            .await
            .unwrap();

        assert_eq!(result.user.id, created.id);
        assert_eq!(result.user.user_type, Some(UserType::Companion));
    }

    #[tokio::test]
    async fn missing_token_is_not_authenticated() {
        let handler = GetCurrentSessionHandler::new(Arc::new(MockIdentityProvider::new()));

        let err = handler
            .handle(GetCurrentSessionQuery {
                access_token: String::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::NotAuthenticated);
    }
}
