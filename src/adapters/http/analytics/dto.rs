//! HTTP DTOs for analytics endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::analytics::{DashboardMetrics, TimeRange, UserEngagement};

#[derive(Debug, Clone, Deserialize)]
pub struct TrackEventRequest {
    pub event_type: String,
    #[serde(default)]
    pub event_data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackEventResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetricsResponse {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingMetricsResponse {
    pub total: usize,
    pub completed: usize,
    pub revenue: f64,
    pub platform_fees: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub time_range: String,
    pub since: String,
    pub users: UserMetricsResponse,
    pub bookings: BookingMetricsResponse,
}

impl DashboardResponse {
    pub fn new(time_range: TimeRange, metrics: DashboardMetrics) -> Self {
        Self {
            time_range: time_range.to_string(),
            since: metrics.since.as_datetime().to_rfc3339(),
            users: UserMetricsResponse {
                total: metrics.users.total,
                active: metrics.users.active,
            },
            bookings: BookingMetricsResponse {
                total: metrics.bookings.total,
                completed: metrics.bookings.completed,
                revenue: metrics.bookings.revenue.as_major_units(),
                platform_fees: metrics.bookings.platform_fees.as_major_units(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
    pub total_events: usize,
    pub event_types: BTreeMap<String, usize>,
}

impl From<UserEngagement> for EngagementResponse {
    fn from(e: UserEngagement) -> Self {
        Self {
            last_activity: e.last_activity.map(|t| t.as_datetime().to_rfc3339()),
            total_events: e.total_events,
            event_types: e.event_types,
        }
    }
}
