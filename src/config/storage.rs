//! Asset store configuration (avatars and media)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Asset store credentials
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Account / cloud name
    pub cloud_name: String,

    /// API key
    pub api_key: String,

    /// API secret
    pub api_secret: SecretString,
}

impl StorageConfig {
    /// Validate asset store configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cloud_name.is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_CLOUD_NAME"));
        }
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_API_KEY"));
        }
        if self.api_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_API_SECRET"));
        }
        Ok(())
    }
}
