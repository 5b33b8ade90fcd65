//! PostgreSQL connection pool settings

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

const POSTGRES_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

/// Hard ceiling for `max_connections`; managed Postgres plans cap well below it.
pub const MAX_POOL_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds a request may wait for a free connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Seconds before an idle connection is closed
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply `migrations/` before serving
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Pool options for the booking, messaging and analytics repositories.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(self.idle_timeout_secs)))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_URL"));
        }
        if !POSTGRES_SCHEMES.iter().any(|scheme| self.url.starts_with(scheme)) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: false,
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market_db() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgresql://market:pw@localhost:5432/market".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fit_a_small_instance() {
        let config = DatabaseConfig::default();
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 10);
        assert!(!config.run_migrations);
    }

    #[test]
    fn url_is_required() {
        assert_eq!(
            DatabaseConfig::default().validate(),
            Err(ValidationError::MissingRequired("DATABASE_URL"))
        );
    }

    #[test]
    fn only_postgres_urls_are_accepted() {
        let config = DatabaseConfig {
            url: "mysql://localhost/market".to_string(),
            ..market_db()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDatabaseUrl));

        let short_scheme = DatabaseConfig {
            url: "postgres://localhost/market".to_string(),
            ..market_db()
        };
        assert!(short_scheme.validate().is_ok());
    }

    #[test]
    fn pool_bounds_are_checked() {
        let inverted = DatabaseConfig {
            min_connections: 8,
            max_connections: 4,
            ..market_db()
        };
        assert_eq!(inverted.validate(), Err(ValidationError::InvalidPoolSize));

        let empty = DatabaseConfig {
            min_connections: 0,
            max_connections: 0,
            ..market_db()
        };
        assert_eq!(empty.validate(), Err(ValidationError::InvalidPoolSize));

        let huge = DatabaseConfig {
            max_connections: MAX_POOL_SIZE + 1,
            ..market_db()
        };
        assert_eq!(huge.validate(), Err(ValidationError::PoolSizeTooLarge));
    }

    #[test]
    fn pool_options_reflect_settings() {
        let config = DatabaseConfig {
            max_connections: 7,
            ..market_db()
        };
        assert_eq!(config.pool_options().get_max_connections(), 7);
    }
}
