//! Telemetry configuration (error reporting DSN and web analytics domain)

use serde::Deserialize;

use super::error::ValidationError;

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Error-reporting DSN
    pub sentry_dsn: String,

    /// Domain registered with the web analytics service
    pub analytics_domain: String,
}

impl TelemetryConfig {
    /// Validate telemetry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sentry_dsn.is_empty() {
            return Err(ValidationError::MissingRequired("SENTRY_DSN"));
        }
        if !self.sentry_dsn.starts_with("https://") && !self.sentry_dsn.starts_with("http://") {
            return Err(ValidationError::InvalidTelemetryDsn);
        }
        if self.analytics_domain.is_empty() {
            return Err(ValidationError::MissingRequired("ANALYTICS_DOMAIN"));
        }
        Ok(())
    }
}
