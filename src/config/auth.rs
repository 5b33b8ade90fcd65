//! Identity provider configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Hosted identity provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the hosted project (the REST API lives under `/auth/v1`)
    pub url: String,

    /// Public (anon) API key sent with every identity call
    pub anon_key: SecretString,

    /// Service-role key for admin calls (compensating user deletion)
    pub service_role_key: SecretString,

    /// HS256 secret the provider signs access tokens with
    pub jwt_secret: SecretString,

    /// Expected `aud` claim on access tokens
    #[serde(default = "default_audience")]
    pub audience: String,

    /// HTTP timeout for identity calls in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AuthConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate identity provider configuration
    ///
    /// In production, requires HTTPS for the provider URL.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        use secrecy::ExposeSecret;

        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_URL"));
        }
        if self.anon_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_ANON_KEY"));
        }
        if self.service_role_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_SERVICE_ROLE_KEY"));
        }
        if self.jwt_secret.expose_secret().len() < 16 {
            return Err(ValidationError::JwtSecretTooShort);
        }

        if *environment == Environment::Production && !self.url.starts_with("https://") {
            return Err(ValidationError::AuthUrlMustBeHttps);
        }

        Ok(())
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_timeout() -> u64 {
    10
}
