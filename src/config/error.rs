//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid host/port combination")]
    InvalidSocketAddr,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Cache check timeout must be positive")]
    InvalidCacheTimeout,

    #[error("Site URL must start with http:// or https://")]
    InvalidSiteUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Identity provider URL must use HTTPS in production")]
    AuthUrlMustBeHttps,

    #[error("JWT secret must be at least 16 characters")]
    JwtSecretTooShort,

    #[error("Invalid Stripe secret key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe publishable key format")]
    InvalidStripePublishableKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Invalid currency code")]
    InvalidCurrency,

    #[error("Invalid telemetry DSN")]
    InvalidTelemetryDsn,

    #[error("Realtime channel capacity must be between 1 and 4096")]
    InvalidChannelCapacity,
}
