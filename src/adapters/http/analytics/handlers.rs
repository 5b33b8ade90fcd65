//! HTTP handlers for analytics endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::application::handlers::analytics::{
    GetDashboardMetricsHandler, GetDashboardMetricsQuery, GetUserEngagementHandler,
    GetUserEngagementQuery, TrackEventCommand, TrackEventHandler,
};
use crate::domain::foundation::UserId;

use super::dto::{
    DashboardQuery, DashboardResponse, EngagementResponse, TrackEventRequest, TrackEventResponse,
};

#[derive(Clone)]
pub struct AnalyticsHandlers {
    pub track: Arc<TrackEventHandler>,
    pub dashboard: Arc<GetDashboardMetricsHandler>,
    pub engagement: Arc<GetUserEngagementHandler>,
}

/// POST /api/analytics/events - anonymous events are allowed.
pub async fn track_event(
    State(handlers): State<AnalyticsHandlers>,
    OptionalAuth(user): OptionalAuth,
    Json(req): Json<TrackEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .track
        .handle(TrackEventCommand {
            event_type: req.event_type,
            event_data: req.event_data,
            user_id: user.map(|u| u.id),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TrackEventResponse {
            id: result.event.id.to_string(),
        }),
    ))
}

/// GET /api/analytics/dashboard?range=30d (admin)
pub async fn dashboard_metrics(
    State(handlers): State<AnalyticsHandlers>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .dashboard
        .handle(GetDashboardMetricsQuery {
            caller: Some(user),
            time_range: query.range,
        })
        .await?;

    Ok(Json(DashboardResponse::new(result.time_range, result.metrics)))
}

/// GET /api/analytics/users/:id/engagement (admin)
pub async fn user_engagement(
    State(handlers): State<AnalyticsHandlers>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target: UserId = user_id
        .parse()
        .map_err(|_| ApiError::invalid_id("user", &user_id))?;

    let result = handlers
        .engagement
        .handle(GetUserEngagementQuery {
            caller: Some(user),
            user_id: target,
        })
        .await?;

    Ok(Json(EngagementResponse::from(result.engagement)))
}
