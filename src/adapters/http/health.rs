//! `GET /health`.
//!
//! Only the database decides overall health. The cache is reported but a
//! cache outage leaves the service healthy.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::ports::HealthCheck;

#[derive(Clone)]
pub struct HealthState {
    pub database: Arc<dyn HealthCheck>,
    pub cache: Option<Arc<dyn HealthCheck>>,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub api: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthResponse {
    Healthy {
        timestamp: String,
        version: &'static str,
        services: ServiceStatus,
    },
    Unhealthy {
        timestamp: String,
        error: String,
    },
}

pub fn health_routes(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

pub async fn health_check(State(state): State<HealthState>) -> impl IntoResponse {
    let timestamp = Timestamp::now().as_datetime().to_rfc3339();

    if let Err(err) = state.database.check().await {
        tracing::error!(dependency = state.database.name(), error = %err, "Health check failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse::Unhealthy {
                timestamp,
                error: "Health check failed".to_string(),
            }),
        );
    }

    let cache = match &state.cache {
        Some(cache) => match cache.check().await {
            Ok(()) => "up",
            Err(err) => {
                tracing::warn!(dependency = cache.name(), error = %err, "Cache check failed");
                "down"
            }
        },
        None => "not_configured",
    };

    (
        StatusCode::OK,
        Json(HealthResponse::Healthy {
            timestamp,
            version: env!("CARGO_PKG_VERSION"),
            services: ServiceStatus {
                api: "up",
                database: "up",
                cache,
            },
        }),
    )
}
