//! Companion Market API server.
//!
//! Reads `COMPANION_MARKET__*` settings (and `.env` in development), connects
//! to PostgreSQL, wires the hosted identity provider and Stripe, and serves
//! the HTTP API.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use companion_market::adapters::auth::{
    HostedIdentityConfig, HostedIdentityProvider, JwtSessionValidator,
};
use companion_market::adapters::http::{build_router, AppPorts, AppSettings, AppState};
use companion_market::adapters::postgres::{
    PostgresBehaviorRepository, PostgresBookingRepository, PostgresConversationRepository,
    PostgresHealthCheck, PostgresProfileRepository,
};
use companion_market::adapters::redis::RedisHealthCheck;
use companion_market::adapters::stripe::{StripeConfig, StripePaymentGateway};
use companion_market::adapters::websocket::ConversationRooms;
use companion_market::config::AppConfig;
use companion_market::ports::HealthCheck;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    info!(
        environment = ?config.server.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Companion Market API"
    );
    if config.payment.is_test_mode() && config.is_production() {
        warn!("Stripe test keys configured in production");
    }

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    let ports = build_ports(&config, pool)?;
    let settings = AppSettings::from_config(&config);
    let app = build_router(AppState::wire(ports, &settings), &settings);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable elsewhere.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

fn build_ports(config: &AppConfig, pool: PgPool) -> Result<AppPorts, Box<dyn std::error::Error>> {
    let identity = Arc::new(HostedIdentityProvider::new(
        HostedIdentityConfig::from_auth_config(&config.auth),
    )?);
    let gateway = Arc::new(StripePaymentGateway::new(StripeConfig::from_payment_config(
        &config.payment,
    ))?);
    let cache_check: Arc<dyn HealthCheck> =
        Arc::new(RedisHealthCheck::open(&config.redis.url, config.redis.timeout())?);

    Ok(AppPorts {
        identity,
        sessions: Arc::new(JwtSessionValidator::from_auth_config(&config.auth)),
        profiles: Arc::new(PostgresProfileRepository::new(pool.clone())),
        bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
        conversations: Arc::new(PostgresConversationRepository::new(pool.clone())),
        events: Arc::new(PostgresBehaviorRepository::new(pool.clone())),
        gateway,
        feed: Arc::new(ConversationRooms::new(config.realtime.channel_capacity)),
        database_check: Arc::new(PostgresHealthCheck::new(pool)),
        cache_check: Some(cache_check),
    })
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
