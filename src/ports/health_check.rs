//! Dependency health checks.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// A single dependency the health endpoint reports on.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Service name used as the key in the health report.
    fn name(&self) -> &'static str;

    /// Performs a cheap round trip to the dependency.
    async fn check(&self) -> Result<(), DomainError>;
}
