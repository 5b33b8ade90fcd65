//! HS256 access-token validator.
//!
//! The hosted identity provider signs access tokens with a shared secret, so
//! sessions are validated locally without a network round trip:
//!
//! 1. Verify the HS256 signature against the project's JWT secret
//! 2. Validate audience and expiry claims
//! 3. Map `sub`, `email` and `user_metadata.user_type` to `AuthenticatedUser`

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId, UserType};
use crate::ports::SessionValidator;

/// Claims carried by provider-issued access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AccessTokenClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: ClaimsMetadata,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct ClaimsMetadata {
    #[serde(default)]
    pub user_type: Option<String>,
}

/// Validates provider-issued HS256 access tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(secret: &SecretString, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, &config.audience)
    }
}

fn user_type_from_claim(raw: Option<&str>) -> UserType {
    match raw {
        None => UserType::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(user_type = raw, "unknown user_type claim, treating as client");
            UserType::default()
        }),
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidAudience => {
                    tracing::warn!("Invalid audience in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            })?;
        let claims = data.claims;

        let user_id: UserId = claims.sub.parse().map_err(|_| {
            tracing::warn!(sub = %claims.sub, "Invalid user ID in token");
            AuthError::InvalidToken
        })?;
        let email = claims.email.ok_or_else(|| {
            tracing::warn!("Token missing email claim");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            email,
            user_type_from_claim(claims.user_metadata.user_type.as_deref()),
        ))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}
