//! HTTP routes for analytics endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{dashboard_metrics, track_event, user_engagement, AnalyticsHandlers};

/// Creates the analytics router, mounted under `/api/analytics`.
pub fn analytics_routes(handlers: AnalyticsHandlers) -> Router {
    Router::new()
        .route("/events", post(track_event))
        .route("/dashboard", get(dashboard_metrics))
        .route("/users/:id/engagement", get(user_engagement))
        .with_state(handlers)
}
