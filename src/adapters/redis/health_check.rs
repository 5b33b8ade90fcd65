//! Redis connectivity check.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::HealthCheck;

/// Connects and sends `PING` on every check.
///
/// Opening the client only parses the URL, so a cache that is down at boot
/// is reported as down rather than failing startup.
#[derive(Clone)]
pub struct RedisHealthCheck {
    client: redis::Client,
    timeout: Duration,
}

impl RedisHealthCheck {
    pub fn open(url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(cache_error)?;
        Ok(Self { client, timeout })
    }

    async fn ping(&self) -> Result<String, DomainError> {
        let mut conn = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(cache_error)?;
        redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)
    }
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Redis error: {}", e))
}

#[async_trait]
impl HealthCheck for RedisHealthCheck {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn check(&self) -> Result<(), DomainError> {
        let pong = tokio::time::timeout(self.timeout, self.ping())
            .await
            .map_err(|_| DomainError::new(ErrorCode::CacheError, "Redis PING timed out"))??;

        if pong != "PONG" {
            return Err(DomainError::new(
                ErrorCode::CacheError,
                format!("unexpected PING reply: {}", pong),
            ));
        }
        Ok(())
    }
}
