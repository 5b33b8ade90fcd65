//! Cache connection settings
//!
//! The cache is only checked by the health endpoint; nothing is stored in it yet.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const REDIS_SCHEMES: [&str; 2] = ["redis://", "rediss://"];

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,

    /// Upper bound for one health check (connect plus PING), in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_tls(&self) -> bool {
        self.url.starts_with("rediss://")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REDIS_URL"));
        }
        if !REDIS_SCHEMES.iter().any(|scheme| self.url.starts_with(scheme)) {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidCacheTimeout);
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2_000
}
